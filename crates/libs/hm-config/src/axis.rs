//! Matrix axis definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A target platform column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAxis {
    /// Short system name, as decoded from job identifiers (`x86_64`).
    pub name: String,
    /// Platform string the CI server uses for builds (`x86_64-linux`).
    /// Sent as the `system` filter and reported back in `build.system`.
    pub platform: String,
    /// Compact header label (`64`).
    pub label: String,
}

impl SystemAxis {
    pub fn new(
        name: impl Into<String>,
        platform: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            label: label.into(),
        }
    }
}

/// A test configuration sub-mode, used only by the test matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavourAxis {
    /// Flavour name as it appears in result manifests.
    pub name: String,
    /// Compact header label.
    pub label: String,
}

impl FlavourAxis {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Substring rewrite applied to job names for column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abbreviation {
    pub from: String,
    pub to: String,
}

impl Abbreviation {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A concrete jobset together with the variant it was derived from.
///
/// `variant` is empty when no variants are configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobsetRef {
    pub jobset: String,
    pub variant: String,
}

impl fmt::Display for SystemAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, \"{}\")", self.name, self.platform, self.label)
    }
}

impl fmt::Display for FlavourAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (\"{}\")", self.name, self.label)
    }
}

impl fmt::Display for JobsetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variant.is_empty() {
            write!(f, "{}", self.jobset)
        } else {
            write!(f, "{} [{}]", self.jobset, self.variant)
        }
    }
}
