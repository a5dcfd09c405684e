//! Records returned by the CI server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the CI server assigns to evaluations and builds.
pub type RecordId = u64;

/// Handle of a grid or matrix row, stable for the lifetime of the
/// structure that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowHandle(pub usize);

/// One completed evaluation run of a jobset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: RecordId,
    /// Jobset the evaluation belongs to. Filled in from the query when the
    /// server omits it.
    #[serde(default)]
    pub jobset: String,
}

/// Job descriptor as listed by the `jobs` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
}

/// A job whose dotted identifier has been decoded.
///
/// See [`crate::ident::decode_job`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Identifier up to the first `.`.
    pub name: String,
    /// Raw identifier, used for build queries.
    pub path: String,
    /// Short system name (`x86_64`, `i686`) when the identifier carries one.
    pub system: Option<String>,
    /// Platform string (`x86_64-linux`) when the identifier carries one.
    pub platform: Option<String>,
}

/// Most recent build matching a (jobset, job, system) query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: RecordId,
    pub job: String,
    pub jobset: String,
    #[serde(default)]
    pub system: String,
    /// `None` while the build has not finished.
    #[serde(default)]
    pub buildstatus: Option<i64>,
    /// Evaluations this build is part of.
    #[serde(default)]
    pub evals: Vec<RecordId>,
}

impl Build {
    /// Whether the build belongs to any of the given evaluations.
    pub fn is_current(&self, evaluations: &[Evaluation]) -> bool {
        evaluations
            .iter()
            .any(|evaluation| self.evals.contains(&evaluation.id))
    }
}

/// Filter for the `latestbuilds` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildQuery {
    pub jobset: String,
    pub job: String,
    /// Platform filter. Omitted when the job identifier already names one.
    pub system: Option<String>,
}

impl fmt::Display for BuildQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.system {
            Some(system) => write!(f, "{}/{} on {}", self.jobset, self.job, system),
            None => write!(f, "{}/{}", self.jobset, self.job),
        }
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Build {} ({}/{} on {})",
            self.id, self.jobset, self.job, self.system
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_build_with_missing_fields() {
        let build: Build = serde_json::from_str(
            r#"{ "id": 7, "job": "rpm.x86_64-linux", "jobset": "master-debug", "buildstatus": null }"#,
        )
        .unwrap();
        assert_eq!(build.id, 7);
        assert_eq!(build.buildstatus, None);
        assert!(build.evals.is_empty());
        assert!(build.system.is_empty());
    }

    #[test]
    fn current_builds_share_an_evaluation() {
        let build = Build {
            id: 1,
            job: String::from("rpm"),
            jobset: String::from("master-debug"),
            system: String::from("x86_64-linux"),
            buildstatus: Some(0),
            evals: vec![10, 11],
        };
        let resolved = [
            Evaluation {
                id: 3,
                jobset: String::from("master-release"),
            },
            Evaluation {
                id: 11,
                jobset: String::from("master-debug"),
            },
        ];
        assert!(build.is_current(&resolved));
        assert!(!build.is_current(&resolved[..1]));
        assert!(!build.is_current(&[]));
    }
}
