//! Job/build join engine for the build-status grid.
//!
//! The grid has one row per distinct job name and one column per
//! (system, variant) pair. Every cell is filled by its own `latestbuilds`
//! query. Answers are published as they arrive, in whatever order the
//! server produces them.

use std::collections::HashMap;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use hm_config::HmConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::CiApi;
use crate::links::Links;
use crate::models::{BuildQuery, Evaluation, Job, RecordId, RowHandle};
use crate::status::{BuildStatus, classify};

/// Address of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub job: String,
    pub system: String,
    /// Empty when no variants are configured.
    pub variant: String,
}

/// One (system, variant) column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridColumn {
    pub system: String,
    pub variant: String,
    pub jobset: String,
    pub label: String,
}

/// Content of a populated cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GridCell {
    Build {
        build: RecordId,
        status: BuildStatus,
        link: String,
        /// Whether the build belongs to one of the resolved evaluations.
        current: bool,
    },
    /// The build query failed.
    Unavailable,
}

/// Presentation seam for the build-status grid.
///
/// All methods have empty defaults so a presenter implements only what it
/// draws.
pub trait GridSink {
    /// Drop everything drawn by a previous run.
    fn reset(&mut self) {}

    /// Column layout, published once before any row.
    fn columns(&mut self, _columns: &[GridColumn]) {}

    /// A job name was seen for the first time.
    fn row_added(&mut self, _row: RowHandle, _job: &str) {}

    /// A cell received its build.
    fn set_cell(
        &mut self,
        _row: RowHandle,
        _column: usize,
        _coordinate: &GridCoordinate,
        _cell: &GridCell,
    ) {
    }
}

impl GridSink for () {}

/// A populated cell together with its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEntry {
    pub coordinate: GridCoordinate,
    pub row: RowHandle,
    pub column: usize,
    pub cell: GridCell,
}

/// Accumulated grid of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: Vec<GridColumn>,
    /// Distinct job names in first-seen order.
    pub rows: Vec<String>,
    pub entries: Vec<GridEntry>,
    #[serde(skip)]
    row_index: HashMap<String, RowHandle>,
    #[serde(skip)]
    entry_index: HashMap<GridCoordinate, usize>,
}

impl Grid {
    /// Columns for every configured system crossed with every variant.
    pub fn new(config: &HmConfig, branch: &str) -> Self {
        let jobsets = config.for_variants(branch);
        let columns = config
            .systems
            .iter()
            .flat_map(|system| {
                jobsets.iter().map(move |jobset| GridColumn {
                    system: system.name.clone(),
                    variant: jobset.variant.clone(),
                    jobset: jobset.jobset.clone(),
                    label: format!("{} {}", system.name, jobset.variant)
                        .trim_end()
                        .to_string(),
                })
            })
            .collect();
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Row of `job`, created on first sight. The flag tells whether the row
    /// is new.
    pub fn ensure_row(&mut self, job: &str) -> (RowHandle, bool) {
        if let Some(row) = self.row_index.get(job) {
            return (*row, false);
        }
        let row = RowHandle(self.rows.len());
        self.rows.push(job.to_string());
        self.row_index.insert(job.to_string(), row);
        (row, true)
    }

    pub fn row(&self, job: &str) -> Option<RowHandle> {
        self.row_index.get(job).copied()
    }

    pub fn column_index(&self, system: &str, variant: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.system == system && column.variant == variant)
    }

    /// Store a cell, replacing any earlier content at the same coordinate.
    pub fn upsert(&mut self, entry: GridEntry) {
        match self.entry_index.get(&entry.coordinate) {
            Some(index) => self.entries[*index] = entry,
            None => {
                self.entry_index
                    .insert(entry.coordinate.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn cell(&self, coordinate: &GridCoordinate) -> Option<&GridCell> {
        self.entry_index
            .get(coordinate)
            .map(|index| &self.entries[*index].cell)
    }
}

struct PendingCell {
    coordinate: GridCoordinate,
    row: RowHandle,
    column: usize,
    query: BuildQuery,
}

/// Look up the latest build of every job in every applicable grid column.
///
/// A job whose identifier names a system is only queried in that system's
/// columns, without a system filter. Other jobs are queried in every
/// column, filtered by the column's platform. Answers without a build
/// leave their cell untouched; failed queries mark it unavailable.
pub async fn join_builds<A, S>(
    api: &A,
    config: &HmConfig,
    branch: &str,
    jobs: &[Job],
    evaluations: &[Evaluation],
    sink: &mut S,
) -> Grid
where
    A: CiApi,
    S: GridSink,
{
    let links = Links::new(&config.server.url);
    let mut grid = Grid::new(config, branch);
    sink.columns(&grid.columns);

    let mut cells = Vec::new();
    for job in jobs {
        let (row, created) = grid.ensure_row(&job.name);
        if created {
            sink.row_added(row, &job.name);
        }
        for (column, column_def) in grid.columns.iter().enumerate() {
            if job
                .system
                .as_deref()
                .is_some_and(|system| system != column_def.system)
            {
                continue;
            }
            let system = if job.path.contains('.') {
                None
            } else {
                config
                    .system_by_name(&column_def.system)
                    .map(|axis| axis.platform.clone())
            };
            cells.push(PendingCell {
                coordinate: GridCoordinate {
                    job: job.name.clone(),
                    system: column_def.system.clone(),
                    variant: column_def.variant.clone(),
                },
                row,
                column,
                query: BuildQuery {
                    jobset: column_def.jobset.clone(),
                    job: job.path.clone(),
                    system,
                },
            });
        }
    }
    debug!("Querying {} grid cell(s) of {branch}", cells.len());

    let mut pending: FuturesUnordered<_> = cells
        .into_iter()
        .map(|cell| async move {
            let result = api.latest_builds(&cell.query).await;
            (cell, result)
        })
        .collect();

    while let Some((cell, result)) = pending.next().await {
        let content = match result {
            Ok(builds) => match builds.into_iter().next() {
                Some(build) => GridCell::Build {
                    build: build.id,
                    status: classify(build.buildstatus),
                    link: links.build(build.id),
                    current: build.is_current(evaluations),
                },
                None => {
                    debug!("No build for {}", cell.query);
                    continue;
                }
            },
            Err(err) => {
                warn!("Failed to fetch latest build for {} - {err}", cell.query);
                GridCell::Unavailable
            }
        };
        sink.set_cell(cell.row, cell.column, &cell.coordinate, &content);
        grid.upsert(GridEntry {
            coordinate: cell.coordinate,
            row: cell.row,
            column: cell.column,
            cell: content,
        });
    }
    grid
}
