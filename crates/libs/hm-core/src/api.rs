//! Queries the aggregator issues against the CI server.

use std::future::Future;

use hm_config::HmConfig;
use hm_requests::ApiClient;
use tracing::debug;

use crate::models::{Build, BuildQuery, Evaluation, JobRecord, RecordId};
use crate::prelude::*;

/// The CI server operations the aggregation engine depends on.
///
/// Implementations perform exactly one request per call and never retry.
pub trait CiApi {
    /// Newest evaluation of `jobset`, as a zero- or one-element list.
    fn latest_evals(&self, jobset: &str) -> impl Future<Output = Result<Vec<Evaluation>>> + Send;

    /// Jobs produced by evaluation `eval` of `jobset`.
    fn jobs(&self, jobset: &str, eval: RecordId)
    -> impl Future<Output = Result<Vec<JobRecord>>> + Send;

    /// Most recent build matching `query`, as a zero- or one-element list.
    fn latest_builds(&self, query: &BuildQuery) -> impl Future<Output = Result<Vec<Build>>> + Send;

    /// Plaintext test-result manifest of a build.
    fn test_results(&self, build: RecordId) -> impl Future<Output = Result<String>> + Send;
}

/// [`CiApi`] backed by the Hydra HTTP API.
#[derive(Debug, Clone)]
pub struct HydraApi {
    client: ApiClient,
    project: String,
}

impl HydraApi {
    pub fn new(client: ApiClient, project: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
        }
    }

    /// Client for the server and project named in `config`.
    pub fn from_config(config: &HmConfig) -> Result<Self> {
        let client = ApiClient::new(config.server.url.clone())?;
        Ok(Self::new(client, config.server.project.clone()))
    }
}

impl CiApi for HydraApi {
    async fn latest_evals(&self, jobset: &str) -> Result<Vec<Evaluation>> {
        debug!("latestevals {jobset}");
        let mut evals: Vec<Evaluation> = self
            .client
            .get_json(
                "api/latestevals",
                [("nr", "1"), ("project", self.project.as_str()), ("jobset", jobset)],
            )
            .await?;
        for eval in evals.iter_mut().filter(|eval| eval.jobset.is_empty()) {
            eval.jobset = jobset.to_string();
        }
        Ok(evals)
    }

    async fn jobs(&self, jobset: &str, eval: RecordId) -> Result<Vec<JobRecord>> {
        debug!("jobs {jobset} eval {eval}");
        let eval = eval.to_string();
        Ok(self
            .client
            .get_json(
                "api/jobs",
                [
                    ("project", self.project.as_str()),
                    ("jobset", jobset),
                    ("eval", eval.as_str()),
                ],
            )
            .await?)
    }

    async fn latest_builds(&self, query: &BuildQuery) -> Result<Vec<Build>> {
        debug!("latestbuilds {query}");
        let mut params = vec![
            ("nr", "1"),
            ("project", self.project.as_str()),
            ("jobset", query.jobset.as_str()),
            ("job", query.job.as_str()),
        ];
        if let Some(system) = &query.system {
            params.push(("system", system.as_str()));
        }
        Ok(self.client.get_json("api/latestbuilds", params).await?)
    }

    async fn test_results(&self, build: RecordId) -> Result<String> {
        debug!("test results of build {build}");
        Ok(self
            .client
            .get_text(&format!("build/{build}/download/1/test-results/list"))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        routing::get,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    type Params = Vec<(String, String)>;

    /// Query strings received by the test server, per endpoint.
    #[derive(Clone, Default)]
    struct Received(Arc<Mutex<Vec<(&'static str, Params)>>>);

    impl Received {
        fn push(&self, endpoint: &'static str, params: Params) {
            self.0.lock().unwrap().push((endpoint, params));
        }

        fn last(&self) -> (&'static str, Params) {
            self.0.lock().unwrap().last().cloned().unwrap()
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    async fn latestevals(State(seen): State<Received>, Query(query): Query<Params>) -> Json<Value> {
        seen.push("latestevals", query);
        Json(json!([{ "id": 7 }]))
    }

    async fn jobs(State(seen): State<Received>, Query(query): Query<Params>) -> Json<Value> {
        seen.push("jobs", query);
        Json(json!([{ "name": "rpm.x86_64-linux" }, { "name": "tarball" }]))
    }

    async fn latestbuilds(State(seen): State<Received>, Query(query): Query<Params>) -> Json<Value> {
        seen.push("latestbuilds", query);
        Json(json!([{
            "id": 11,
            "job": "tarball",
            "jobset": "master-debug",
            "system": "x86_64-linux",
            "buildstatus": 0,
            "evals": [7]
        }]))
    }

    async fn manifest(Path(id): Path<u64>) -> core::result::Result<String, StatusCode> {
        if id == 11 {
            Ok(String::from("shell/lvcreate.sh passed\n"))
        } else {
            Err(StatusCode::NOT_FOUND)
        }
    }

    async fn serve() -> (HydraApi, Received) {
        let received = Received::default();
        let app = Router::new()
            .route("/api/latestevals", get(latestevals))
            .route("/api/jobs", get(jobs))
            .route("/api/latestbuilds", get(latestbuilds))
            .route("/build/{id}/download/1/test-results/list", get(manifest))
            .with_state(received.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = ApiClient::new(format!("http://{addr}")).unwrap();
        (HydraApi::new(client, "lvm2"), received)
    }

    #[tokio::test]
    async fn latest_evals_fills_in_jobset() {
        let (api, received) = serve().await;

        let evals = api.latest_evals("master-debug").await.unwrap();

        assert_eq!(
            evals,
            vec![Evaluation {
                id: 7,
                jobset: String::from("master-debug"),
            }]
        );
        assert_eq!(
            received.last(),
            (
                "latestevals",
                params(&[("nr", "1"), ("project", "lvm2"), ("jobset", "master-debug")])
            )
        );
    }

    #[tokio::test]
    async fn jobs_of_an_evaluation() {
        let (api, received) = serve().await;

        let jobs = api.jobs("master-debug", 7).await.unwrap();

        let names: Vec<&str> = jobs.iter().map(|job| job.name.as_str()).collect();
        assert_eq!(names, vec!["rpm.x86_64-linux", "tarball"]);
        assert_eq!(
            received.last(),
            (
                "jobs",
                params(&[("project", "lvm2"), ("jobset", "master-debug"), ("eval", "7")])
            )
        );
    }

    #[tokio::test]
    async fn latest_builds_with_system_filter() {
        let (api, received) = serve().await;
        let query = BuildQuery {
            jobset: String::from("master-debug"),
            job: String::from("tarball"),
            system: Some(String::from("x86_64-linux")),
        };

        let builds = api.latest_builds(&query).await.unwrap();

        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].id, 11);
        assert_eq!(builds[0].evals, vec![7]);
        assert_eq!(
            received.last(),
            (
                "latestbuilds",
                params(&[
                    ("nr", "1"),
                    ("project", "lvm2"),
                    ("jobset", "master-debug"),
                    ("job", "tarball"),
                    ("system", "x86_64-linux"),
                ])
            )
        );
    }

    #[tokio::test]
    async fn latest_builds_without_system_filter() {
        let (api, received) = serve().await;
        let query = BuildQuery {
            jobset: String::from("master-debug"),
            job: String::from("rpm.x86_64-linux"),
            system: None,
        };

        api.latest_builds(&query).await.unwrap();

        let (endpoint, sent) = received.last();
        assert_eq!(endpoint, "latestbuilds");
        assert_eq!(
            sent,
            params(&[
                ("nr", "1"),
                ("project", "lvm2"),
                ("jobset", "master-debug"),
                ("job", "rpm.x86_64-linux"),
            ])
        );
    }

    #[tokio::test]
    async fn test_results_of_a_build() {
        let (api, _) = serve().await;

        let text = api.test_results(11).await.unwrap();
        assert_eq!(text, "shell/lvcreate.sh passed\n");

        let missing = api.test_results(12).await;
        assert!(matches!(
            missing,
            Err(Error::Requests(hm_requests::Error::Status { status: 404, .. }))
        ));
    }
}
