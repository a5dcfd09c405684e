//! Top-level aggregation for one branch.

use hm_config::HmConfig;
use tracing::info;

use crate::api::CiApi;
use crate::grid::{Grid, GridSink, join_builds};
use crate::matrix::{Matrix, MatrixSink, build_matrix};
use crate::resolver::EvaluationResolver;

/// Runs either render mode against a CI server.
///
/// Every call starts from a reset sink and fresh accumulators, so repeated
/// invocations for different branches never leak cells into each other.
pub struct Aggregator<A> {
    api: A,
    config: HmConfig,
}

impl<A: CiApi> Aggregator<A> {
    pub fn new(api: A, config: HmConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &HmConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Build-status grid of `branch`: every job against every system and
    /// variant.
    pub async fn render_grid<S: GridSink>(&self, branch: &str, sink: &mut S) -> Grid {
        sink.reset();
        let resolver = EvaluationResolver::new(&self.api, &self.config);
        let Some(discovery) = resolver.discover(branch).await else {
            return Grid::default();
        };
        let grid = join_builds(
            &self.api,
            &self.config,
            branch,
            &discovery.jobs,
            &discovery.evaluations,
            sink,
        )
        .await;
        info!(
            "Grid of {branch}: {} row(s), {} cell(s)",
            grid.rows.len(),
            grid.entries.len()
        );
        grid
    }

    /// Test-result matrix of the base variant of `branch`.
    pub async fn render_matrix<S: MatrixSink>(&self, branch: &str, sink: &mut S) -> Matrix {
        sink.reset();
        let resolver = EvaluationResolver::new(&self.api, &self.config);
        let Some(discovery) = resolver.discover(branch).await else {
            return Matrix::default();
        };
        let matrix = build_matrix(
            &self.api,
            &self.config,
            &discovery.base.jobset,
            &discovery.jobs,
            sink,
        )
        .await;
        info!(
            "Matrix of {branch}: {} build(s), {} test(s)",
            matrix.columns.len(),
            matrix.rows.len()
        );
        matrix
    }
}
