//! Evaluation resolution and job discovery.
//!
//! Before any build is looked up, the resolver collects the latest
//! evaluation of every variant jobset of a branch. That set decides which
//! builds count as current, so discovery waits for every lookup to settle
//! before it fetches the job list of the base variant.

use futures::future::join_all;
use hm_config::{HmConfig, JobsetRef};
use tracing::{info, warn};

use crate::api::CiApi;
use crate::ident::decode_job;
use crate::models::{Evaluation, Job};

/// Outcome of discovery for one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Latest evaluation of each variant jobset that has one.
    pub evaluations: Vec<Evaluation>,
    /// Evaluation whose job list was enumerated.
    pub base: Evaluation,
    /// Decoded jobs of the base evaluation, in server order.
    pub jobs: Vec<Job>,
}

/// Resolves latest evaluations for the branches described by a config.
pub struct EvaluationResolver<'a, A> {
    api: &'a A,
    config: &'a HmConfig,
}

impl<'a, A: CiApi> EvaluationResolver<'a, A> {
    pub fn new(api: &'a A, config: &'a HmConfig) -> Self {
        Self { api, config }
    }

    /// Latest evaluation of one jobset. Failed lookups count as empty.
    async fn latest_evaluation(&self, jobset: &str) -> Option<Evaluation> {
        match self.api.latest_evals(jobset).await {
            Ok(evals) => evals.into_iter().next(),
            Err(err) => {
                warn!("Failed to fetch latest evaluation of {jobset} - {err}");
                None
            }
        }
    }

    /// Latest evaluation of every variant jobset of `branch`.
    ///
    /// Completes only once all `max(variants, 1)` lookups have answered,
    /// successfully or not. The result is in variant order and omits
    /// jobsets without an evaluation.
    pub async fn resolve_latest_evaluations(&self, branch: &str) -> Vec<Evaluation> {
        let jobsets = self.config.for_variants(branch);
        let lookups = jobsets.iter().map(|JobsetRef { jobset, .. }| async move {
            let evaluation = self.latest_evaluation(jobset).await;
            if let Some(evaluation) = &evaluation {
                info!("Fetched evaluation {} of {jobset}", evaluation.id);
            }
            evaluation
        });
        let evaluations: Vec<Evaluation> = join_all(lookups).await.into_iter().flatten().collect();
        info!(
            "Resolved {} evaluation(s) for {} jobset(s) of {branch}",
            evaluations.len(),
            jobsets.len()
        );
        evaluations
    }

    /// Latest evaluation of the base variant jobset of `branch`.
    pub async fn resolve_base_evaluation(&self, branch: &str) -> Option<Evaluation> {
        self.latest_evaluation(&self.config.base_jobset(branch))
            .await
    }

    /// Decoded jobs of `evaluation`. A failed listing yields no jobs.
    pub async fn fetch_jobs(&self, evaluation: &Evaluation) -> Vec<Job> {
        match self.api.jobs(&evaluation.jobset, evaluation.id).await {
            Ok(jobs) => jobs.iter().map(|job| decode_job(&job.name)).collect(),
            Err(err) => {
                warn!(
                    "Failed to list jobs of evaluation {} ({}) - {err}",
                    evaluation.id, evaluation.jobset
                );
                Vec::new()
            }
        }
    }

    /// Resolve all variant evaluations, then list the base evaluation's jobs.
    ///
    /// Returns `None` when the base variant has no evaluation or the
    /// evaluation has no jobs; nothing is rendered for such a branch.
    pub async fn discover(&self, branch: &str) -> Option<Discovery> {
        let evaluations = self.resolve_latest_evaluations(branch).await;

        let Some(mut base) = self.resolve_base_evaluation(branch).await else {
            info!("No evaluation of {}, nothing to do", self.config.base_jobset(branch));
            return None;
        };
        if base.jobset.is_empty() {
            base.jobset = self.config.base_jobset(branch);
        }
        info!("Base evaluation {} of {}", base.id, base.jobset);

        let jobs = self.fetch_jobs(&base).await;
        if jobs.is_empty() {
            info!("Evaluation {} has no jobs", base.id);
            return None;
        }
        Some(Discovery {
            evaluations,
            base,
            jobs,
        })
    }
}
