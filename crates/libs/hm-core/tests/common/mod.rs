#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use hm_config::{FlavourAxis, HmConfig};
use hm_core::api::CiApi;
use hm_core::grid::{GridCell, GridColumn, GridCoordinate, GridSink};
use hm_core::matrix::{MatrixCell, MatrixColumn, MatrixRow, MatrixSink};
use hm_core::models::{Build, BuildQuery, Evaluation, JobRecord, RecordId, RowHandle};
use hm_core::prelude::*;
use tokio::time::sleep;

/// Scripted answer of the fake server.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T, u64),
    Fail(u64),
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self, what: &str) -> Result<T> {
        match self {
            Reply::Ok(value, delay) => {
                sleep(Duration::from_millis(*delay)).await;
                Ok(value.clone())
            }
            Reply::Fail(delay) => {
                sleep(Duration::from_millis(*delay)).await;
                Err(Error::Requests(hm_requests::Error::Status {
                    status: 500,
                    url: what.to_string(),
                }))
            }
        }
    }
}

/// In-memory CI server. Unscripted queries answer with nothing, except
/// manifests, which answer with a failure.
#[derive(Default)]
pub struct FakeCi {
    pub evals: HashMap<String, Reply<Vec<Evaluation>>>,
    pub jobs: HashMap<(String, RecordId), Vec<JobRecord>>,
    pub builds: HashMap<BuildKey, Reply<Vec<Build>>>,
    pub manifests: HashMap<RecordId, Reply<String>>,
    log: Mutex<Vec<String>>,
}

pub type BuildKey = (String, String, Option<String>);

impl FakeCi {
    pub fn eval(mut self, jobset: &str, id: RecordId, delay: u64) -> Self {
        self.evals.insert(
            jobset.to_string(),
            Reply::Ok(
                vec![Evaluation {
                    id,
                    jobset: jobset.to_string(),
                }],
                delay,
            ),
        );
        self
    }

    pub fn eval_reply(mut self, jobset: &str, reply: Reply<Vec<Evaluation>>) -> Self {
        self.evals.insert(jobset.to_string(), reply);
        self
    }

    pub fn job_list(mut self, jobset: &str, eval: RecordId, names: &[&str]) -> Self {
        self.jobs.insert(
            (jobset.to_string(), eval),
            names
                .iter()
                .map(|name| JobRecord {
                    name: name.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn build(mut self, jobset: &str, job: &str, system: Option<&str>, build: Build) -> Self {
        self.builds.insert(
            key(jobset, job, system),
            Reply::Ok(vec![build], 0),
        );
        self
    }

    pub fn build_reply(
        mut self,
        jobset: &str,
        job: &str,
        system: Option<&str>,
        reply: Reply<Vec<Build>>,
    ) -> Self {
        self.builds.insert(key(jobset, job, system), reply);
        self
    }

    pub fn manifest(mut self, build: RecordId, text: &str, delay: u64) -> Self {
        self.manifests
            .insert(build, Reply::Ok(text.to_string(), delay));
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log().iter().filter(|entry| entry.starts_with(prefix)).count()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

pub fn key(jobset: &str, job: &str, system: Option<&str>) -> BuildKey {
    (
        jobset.to_string(),
        job.to_string(),
        system.map(str::to_string),
    )
}

impl CiApi for FakeCi {
    async fn latest_evals(&self, jobset: &str) -> Result<Vec<Evaluation>> {
        self.record(format!("evals {jobset}"));
        let result = match self.evals.get(jobset) {
            Some(reply) => reply.resolve(jobset).await,
            None => Ok(Vec::new()),
        };
        self.record(format!("evals-done {jobset}"));
        result
    }

    async fn jobs(&self, jobset: &str, eval: RecordId) -> Result<Vec<JobRecord>> {
        self.record(format!("jobs {jobset} {eval}"));
        Ok(self
            .jobs
            .get(&(jobset.to_string(), eval))
            .cloned()
            .unwrap_or_default())
    }

    async fn latest_builds(&self, query: &BuildQuery) -> Result<Vec<Build>> {
        self.record(format!("builds {query}"));
        let key = (
            query.jobset.clone(),
            query.job.clone(),
            query.system.clone(),
        );
        match self.builds.get(&key) {
            Some(reply) => reply.resolve(&query.to_string()).await,
            None => Ok(Vec::new()),
        }
    }

    async fn test_results(&self, build: RecordId) -> Result<String> {
        self.record(format!("manifest {build}"));
        let reply = self
            .manifests
            .get(&build)
            .cloned()
            .unwrap_or(Reply::Fail(0));
        reply.resolve(&format!("build {build}")).await
    }
}

pub fn make_build(id: RecordId, job: &str, jobset: &str, system: &str, status: i64, evals: &[RecordId]) -> Build {
    Build {
        id,
        job: job.to_string(),
        jobset: jobset.to_string(),
        system: system.to_string(),
        buildstatus: Some(status),
        evals: evals.to_vec(),
    }
}

pub fn config(variants: &[&str]) -> HmConfig {
    let mut config = HmConfig::new("http://hydra", "lvm2");
    config.variants = variants.iter().map(|v| v.to_string()).collect();
    config
}

pub fn flavoured_config(variants: &[&str]) -> HmConfig {
    let mut config = config(variants);
    config.flavours = vec![
        FlavourAxis::new("normal", "n"),
        FlavourAxis::new("cluster", "c"),
    ];
    config
}

/// Presentation events, in the order the engine produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Reset,
    Columns(usize),
    Row(RowHandle, String),
    Cell(RowHandle, usize, String),
    Header(Vec<RecordId>),
    ColumnHeader(usize),
    ColumnFailed(usize),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
    pub grid_cells: HashMap<GridCoordinate, GridCell>,
    pub matrix_cells: Vec<MatrixCell>,
}

impl RecordingSink {
    pub fn position(&self, matches: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(matches)
    }
}

impl GridSink for RecordingSink {
    fn reset(&mut self) {
        self.events.clear();
        self.grid_cells.clear();
        self.matrix_cells.clear();
        self.events.push(Event::Reset);
    }

    fn columns(&mut self, columns: &[GridColumn]) {
        self.events.push(Event::Columns(columns.len()));
    }

    fn row_added(&mut self, row: RowHandle, job: &str) {
        self.events.push(Event::Row(row, job.to_string()));
    }

    fn set_cell(
        &mut self,
        row: RowHandle,
        column: usize,
        coordinate: &GridCoordinate,
        cell: &GridCell,
    ) {
        self.events
            .push(Event::Cell(row, column, coordinate.job.clone()));
        self.grid_cells.insert(coordinate.clone(), cell.clone());
    }
}

impl MatrixSink for RecordingSink {
    fn reset(&mut self) {
        GridSink::reset(self);
    }

    fn header(&mut self, columns: &[MatrixColumn]) {
        self.events.push(Event::Header(
            columns.iter().map(|column| column.build.id).collect(),
        ));
    }

    fn column_header(&mut self, column: usize, _header: &MatrixColumn) {
        self.events.push(Event::ColumnHeader(column));
    }

    fn row_added(&mut self, row: RowHandle, test: &MatrixRow) {
        self.events.push(Event::Row(row, test.display.clone()));
    }

    fn set_cell(&mut self, row: RowHandle, column: usize, cell: &MatrixCell) {
        self.events
            .push(Event::Cell(row, column, cell.outcome.clone()));
        self.matrix_cells.push(cell.clone());
    }

    fn column_failed(&mut self, column: usize, _header: &MatrixColumn) {
        self.events.push(Event::ColumnFailed(column));
    }
}

pub fn coordinate(job: &str, system: &str, variant: &str) -> GridCoordinate {
    GridCoordinate {
        job: job.to_string(),
        system: system.to_string(),
        variant: variant.to_string(),
    }
}
