//! Configuration management for the hydra-matrix aggregator.
//!
//! Describes which CI server to query and the axes the status matrix is
//! laid out on: systems, variants and flavours.
//!
//! # Usage
//!
//! ```rust
//! use hm_config::HmConfig;
//!
//! let config = HmConfig::from_toml(r#"
//!     variants = ["debug", "release"]
//!
//!     [server]
//!     url = "https://hydra.example.com"
//!     project = "lvm2"
//! "#).unwrap();
//!
//! assert_eq!(config.base_jobset("master"), "master-debug");
//! ```

pub mod axis;
pub mod error;
pub mod hm_config;
pub mod prelude;

pub use axis::{Abbreviation, FlavourAxis, JobsetRef, SystemAxis};
pub use hm_config::{HmConfig, ServerConfig, TestNaming};
