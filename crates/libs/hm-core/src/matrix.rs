//! Test-result matrix builder.
//!
//! Rows are tests, columns are builds. Each build column is split by the
//! secondary axis: flavours when they are configured, systems otherwise.
//! The header can only be laid out once every job's latest build is known,
//! so build lookup is a barrier; manifests are then streamed in and applied
//! to the matrix as each one arrives.

use std::collections::HashMap;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use hm_config::HmConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::CiApi;
use crate::ident::{abbreviate_name, result_file_name, test_display_name, test_row_key};
use crate::links::Links;
use crate::manifest::{glyph_for, parse_manifest};
use crate::models::{Build, BuildQuery, Job, RecordId, RowHandle};

/// One secondary-axis sub-column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisColumn {
    /// Flavour name, or the platform string builds report.
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnState {
    /// Manifest not fetched yet.
    Loading,
    Loaded,
    /// Manifest could not be fetched.
    Failed,
}

/// All sub-columns belonging to one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixColumn {
    pub build: Build,
    /// Abbreviated job name.
    pub title: String,
    pub link: String,
    /// Coverage report once loaded, raw build log once failed.
    pub detail_link: Option<String>,
    pub state: ColumnState,
    pub axis: Vec<AxisColumn>,
}

impl MatrixColumn {
    pub fn has_axis(&self, key: &str) -> bool {
        self.axis.iter().any(|axis| axis.key == key)
    }
}

/// Outcome of one test in one sub-column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub build: RecordId,
    pub axis: String,
    /// Outcome token, doubling as the cell's style class.
    pub outcome: String,
    pub glyph: String,
    pub link: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Flat key for presenters, see [`test_row_key`].
    pub key: String,
    pub test_id: String,
    pub display: String,
    pub cells: Vec<MatrixCell>,
    #[serde(skip)]
    cell_index: HashMap<(RecordId, String), usize>,
}

impl MatrixRow {
    pub fn cell(&self, build: RecordId, axis: &str) -> Option<&MatrixCell> {
        self.cell_index
            .get(&(build, axis.to_string()))
            .map(|index| &self.cells[*index])
    }

    /// Store a cell, replacing any earlier outcome at the same build and
    /// axis.
    pub fn upsert(&mut self, cell: MatrixCell) {
        match self.cell_index.get(&(cell.build, cell.axis.clone())) {
            Some(index) => self.cells[*index] = cell,
            None => {
                self.cell_index
                    .insert((cell.build, cell.axis.clone()), self.cells.len());
                self.cells.push(cell);
            }
        }
    }
}

/// Presentation seam for the test matrix.
pub trait MatrixSink {
    /// Drop everything drawn by a previous run.
    fn reset(&mut self) {}

    /// Header layout, published once all builds are known.
    fn header(&mut self, _columns: &[MatrixColumn]) {}

    /// A column's header changed state.
    fn column_header(&mut self, _column: usize, _header: &MatrixColumn) {}

    /// A test was seen for the first time.
    fn row_added(&mut self, _row: RowHandle, _test: &MatrixRow) {}

    fn set_cell(&mut self, _row: RowHandle, _column: usize, _cell: &MatrixCell) {}

    /// The build's manifest could not be loaded.
    fn column_failed(&mut self, _column: usize, _header: &MatrixColumn) {}
}

impl MatrixSink for () {}

/// Accumulated test matrix of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub columns: Vec<MatrixColumn>,
    /// Tests in first-seen order.
    pub rows: Vec<MatrixRow>,
    /// Rows by raw test identifier.
    #[serde(skip)]
    row_index: HashMap<String, RowHandle>,
}

impl Matrix {
    /// One column per build, each split by the secondary axis.
    pub fn new(config: &HmConfig, builds: Vec<Build>) -> Self {
        let links = Links::new(&config.server.url);
        let axis: Vec<AxisColumn> = if config.flavours.is_empty() {
            config
                .systems
                .iter()
                .map(|system| AxisColumn {
                    key: system.platform.clone(),
                    label: system.label.clone(),
                })
                .collect()
        } else {
            config
                .flavours
                .iter()
                .map(|flavour| AxisColumn {
                    key: flavour.name.clone(),
                    label: flavour.label.clone(),
                })
                .collect()
        };
        let columns = builds
            .into_iter()
            .map(|build| MatrixColumn {
                title: abbreviate_name(&build.job, &config.abbreviations),
                link: links.build(build.id),
                detail_link: None,
                state: ColumnState::Loading,
                axis: axis.clone(),
                build,
            })
            .collect();
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn row(&self, test_id: &str) -> Option<&MatrixRow> {
        self.row_index
            .get(test_id)
            .map(|row| &self.rows[row.0])
    }

    pub fn column(&self, build: RecordId) -> Option<&MatrixColumn> {
        self.columns.iter().find(|column| column.build.id == build)
    }

    pub fn cell(&self, test_id: &str, build: RecordId, axis: &str) -> Option<&MatrixCell> {
        self.row(test_id)?.cell(build, axis)
    }

    /// Row of `test_id`, created on first sight. The flag tells whether the
    /// row is new.
    pub fn ensure_row(&mut self, test_id: &str, config: &HmConfig) -> (RowHandle, bool) {
        if let Some(row) = self.row_index.get(test_id) {
            return (*row, false);
        }
        let row = RowHandle(self.rows.len());
        self.rows.push(MatrixRow {
            key: test_row_key(test_id),
            test_id: test_id.to_string(),
            display: test_display_name(test_id, &config.tests),
            cells: Vec::new(),
            cell_index: HashMap::new(),
        });
        self.row_index.insert(test_id.to_string(), row);
        (row, true)
    }

    /// Store a cell, replacing any earlier outcome at the same build and
    /// axis.
    pub fn upsert(&mut self, row: RowHandle, cell: MatrixCell) {
        self.rows[row.0].upsert(cell);
    }

    /// Apply a build's manifest to its column.
    pub fn apply_manifest<S: MatrixSink>(
        &mut self,
        column: usize,
        text: &str,
        config: &HmConfig,
        sink: &mut S,
    ) {
        let links = Links::new(&config.server.url);
        let flavoured = !config.flavours.is_empty();
        let (build, axis_keys) = {
            let header = &mut self.columns[column];
            header.state = ColumnState::Loaded;
            header.detail_link = Some(links.coverage(header.build.id));
            sink.column_header(column, header);
            let keys: Vec<String> = header.axis.iter().map(|axis| axis.key.clone()).collect();
            (header.build.clone(), keys)
        };

        let records = parse_manifest(text, flavoured);
        debug!("Build {} reported {} test result(s)", build.id, records.len());
        for record in records {
            let (row, created) = self.ensure_row(&record.test_id, config);
            if created {
                sink.row_added(row, &self.rows[row.0]);
            }

            let targets = match (&record.flavour, flavoured) {
                (Some(flavour), _) => vec![flavour.clone()],
                (None, true) => axis_keys.clone(),
                (None, false) => vec![build.system.clone()],
            };
            let file = result_file_name(&record.test_id);
            for axis in targets {
                if !axis_keys.contains(&axis) {
                    debug!("Build {} has no '{axis}' column for {}", build.id, record.test_id);
                    continue;
                }
                let cell = MatrixCell {
                    build: build.id,
                    title: format!(
                        "{}: {} on {}",
                        build.job,
                        record.test_id,
                        record.flavour.as_deref().unwrap_or(&axis)
                    ),
                    link: links.test_result(build.id, record.flavour.as_deref(), &file),
                    glyph: glyph_for(config, &record.outcome).to_string(),
                    outcome: record.outcome.clone(),
                    axis,
                };
                sink.set_cell(row, column, &cell);
                self.upsert(row, cell);
            }
        }
    }

    /// Mark a build's column as failed to load.
    pub fn fail_column<S: MatrixSink>(&mut self, column: usize, config: &HmConfig, sink: &mut S) {
        let links = Links::new(&config.server.url);
        let header = &mut self.columns[column];
        header.state = ColumnState::Failed;
        header.detail_link = Some(links.raw_log(header.build.id));
        sink.column_failed(column, header);
    }
}

/// Latest build of `job` in `jobset`. Failures count as no build.
async fn latest_build<A: CiApi>(api: &A, jobset: &str, job: &Job) -> Option<Build> {
    let query = BuildQuery {
        jobset: jobset.to_string(),
        job: job.path.clone(),
        system: None,
    };
    match api.latest_builds(&query).await {
        Ok(builds) => builds.into_iter().next(),
        Err(err) => {
            warn!("Failed to fetch latest build for {query} - {err}");
            None
        }
    }
}

/// Build the test matrix for `jobs` of `jobset`.
///
/// Jobs are ordered by identifier. Jobs without a build get no column.
/// A build whose manifest cannot be fetched keeps its column, marked
/// failed, and contributes no rows.
pub async fn build_matrix<A, S>(
    api: &A,
    config: &HmConfig,
    jobset: &str,
    jobs: &[Job],
    sink: &mut S,
) -> Matrix
where
    A: CiApi,
    S: MatrixSink,
{
    let mut jobs: Vec<&Job> = jobs.iter().collect();
    jobs.sort_by(|a, b| a.path.cmp(&b.path));

    let builds: Vec<Build> = join_all(jobs.iter().map(|job| latest_build(api, jobset, job)))
        .await
        .into_iter()
        .flatten()
        .collect();
    info!("Found {} build(s) for {} job(s) of {jobset}", builds.len(), jobs.len());

    let mut matrix = Matrix::new(config, builds);
    sink.header(&matrix.columns);
    for (column, header) in matrix.columns.iter().enumerate() {
        sink.column_header(column, header);
    }

    let mut pending: FuturesUnordered<_> = matrix
        .columns
        .iter()
        .enumerate()
        .map(|(column, header)| {
            let build = header.build.id;
            async move { (column, api.test_results(build).await) }
        })
        .collect();

    while let Some((column, result)) = pending.next().await {
        match result {
            Ok(text) => matrix.apply_manifest(column, &text, config, sink),
            Err(err) => {
                warn!(
                    "Failed to load test results of build {} - {err}",
                    matrix.columns[column].build.id
                );
                matrix.fail_column(column, config, sink);
            }
        }
    }
    matrix
}
