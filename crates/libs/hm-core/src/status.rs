//! Build status classification.
//!
//! Hydra reports build results as a small integer. The mapping below is
//! the server's fixed enumeration and must not be reordered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic class of a build status, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Good,
    Build,
    Deps,
    Aborted,
    Tests,
    /// No class; serialized as the empty string.
    #[serde(rename = "")]
    Unknown,
}

impl StatusCategory {
    /// Class name; empty for statuses without a class.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Good => "good",
            StatusCategory::Build => "build",
            StatusCategory::Deps => "deps",
            StatusCategory::Aborted => "aborted",
            StatusCategory::Tests => "tests",
            StatusCategory::Unknown => "",
        }
    }
}

/// Category and human-readable label of a build status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub category: StatusCategory,
    pub label: String,
}

/// Classify a `buildstatus` code. Unfinished builds have no code.
pub fn classify(code: Option<i64>) -> BuildStatus {
    let (category, label) = match code {
        Some(0) => (StatusCategory::Good, "good"),
        Some(1) => (StatusCategory::Build, "build error"),
        Some(2) => (StatusCategory::Deps, "dependency"),
        Some(3) => (StatusCategory::Aborted, "aborted"),
        Some(4) => (StatusCategory::Unknown, "4"),
        Some(5) => (StatusCategory::Unknown, "5"),
        Some(6) => (StatusCategory::Tests, "tests failed"),
        _ => (StatusCategory::Unknown, "??"),
    };
    BuildStatus {
        category,
        label: label.to_string(),
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
