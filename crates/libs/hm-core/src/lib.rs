//! Aggregation and join engine for Hydra CI status matrices.
//!
//! Turns a CI server's evaluation, job and build records into one of two
//! render-ready structures:
//!
//! - a build-status [`grid::Grid`]: job × system × variant, one latest
//!   build per cell;
//! - a test-result [`matrix::Matrix`]: test × build × flavour (or system),
//!   parsed from each build's result manifest.
//!
//! Both modes share evaluation resolution ([`resolver`]) and the query seam
//! ([`api::CiApi`]). Presentation happens through the [`grid::GridSink`]
//! and [`matrix::MatrixSink`] traits.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hm_config::HmConfig;
//! use hm_core::{aggregator::Aggregator, api::HydraApi};
//!
//! # async fn example() -> hm_core::prelude::Result<()> {
//! let config = HmConfig::new("https://hydra.example.com", "lvm2");
//! let aggregator = Aggregator::new(HydraApi::from_config(&config)?, config);
//! let grid = aggregator.render_grid("master", &mut ()).await;
//! println!("{} jobs", grid.rows.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod api;
pub mod error;
pub mod grid;
pub mod ident;
pub mod links;
pub mod manifest;
pub mod matrix;
pub mod models;
pub mod prelude;
pub mod resolver;
pub mod status;

pub use aggregator::Aggregator;
pub use api::{CiApi, HydraApi};
