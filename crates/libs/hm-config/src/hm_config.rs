//! Core configuration types for the hydra-matrix aggregator.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::axis::{Abbreviation, FlavourAxis, JobsetRef, SystemAxis};
use crate::prelude::*;

/// CI server coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the Hydra instance.
    pub url: String,
    /// Hydra project whose jobsets are aggregated.
    pub project: String,
}

/// How test identifiers from result manifests are shortened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestNaming {
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: String,
    #[serde(default = "default_strip_suffix")]
    pub strip_suffix: String,
}

impl Default for TestNaming {
    fn default() -> Self {
        Self {
            strip_prefix: default_strip_prefix(),
            strip_suffix: default_strip_suffix(),
        }
    }
}

/// Complete aggregator configuration. Usually loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmConfig {
    pub server: ServerConfig,

    /// Ordered system columns.
    #[serde(default = "default_systems")]
    pub systems: Vec<SystemAxis>,

    /// Ordered jobset suffixes. The first one is the base variant.
    #[serde(default)]
    pub variants: Vec<String>,

    /// Secondary test-matrix axis. When empty, systems are used instead.
    #[serde(default)]
    pub flavours: Vec<FlavourAxis>,

    /// Outcome token to single-glyph table.
    #[serde(default = "default_outcomes")]
    pub outcomes: BTreeMap<String, String>,

    /// Header abbreviations, applied in order.
    #[serde(default = "default_abbreviations")]
    pub abbreviations: Vec<Abbreviation>,

    #[serde(default)]
    pub tests: TestNaming,
}

fn default_strip_prefix() -> String {
    String::from("shell/")
}

fn default_strip_suffix() -> String {
    String::from(".sh")
}

fn default_systems() -> Vec<SystemAxis> {
    vec![
        SystemAxis::new("i686", "i686-linux", "32"),
        SystemAxis::new("x86_64", "x86_64-linux", "64"),
    ]
}

fn default_outcomes() -> BTreeMap<String, String> {
    [
        ("passed", "✓"),
        ("good", "✓"),
        ("warnings", "!"),
        ("failed", "x"),
        ("skipped", "–"),
        ("timeout", "T"),
        ("undef", "?"),
    ]
    .into_iter()
    .map(|(token, glyph)| (token.to_string(), glyph.to_string()))
    .collect()
}

fn default_abbreviations() -> Vec<Abbreviation> {
    [
        ("_x86_64", " 64"),
        ("_i386", " 32"),
        ("rawhide", "rhide"),
        ("clang_", "c "),
        ("gcc_", "g "),
        ("compression", "cpr"),
        ("hashcompaction", "hc"),
        ("minimal", "min"),
        ("explicit", "exp"),
        ("ubuntu", "ub"),
        ("fedora", "fc"),
        ("_small", "s"),
    ]
    .into_iter()
    .map(|(from, to)| Abbreviation::new(from, to))
    .collect()
}

impl HmConfig {
    /// Configuration with the default axes and no variants or flavours.
    pub fn new(url: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                url: url.into(),
                project: project.into(),
            },
            systems: default_systems(),
            variants: Vec::new(),
            flavours: Vec::new(),
            outcomes: default_outcomes(),
            abbreviations: default_abbreviations(),
            tests: TestNaming::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", file_path.display());
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        let config: Self = toml::from_str(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the aggregator cannot lay out.
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(Error::Invalid(String::from("server.url is empty")));
        }
        if self.server.project.trim().is_empty() {
            return Err(Error::Invalid(String::from("server.project is empty")));
        }
        let mut seen = HashSet::new();
        for system in &self.systems {
            if !seen.insert(system.name.as_str()) {
                return Err(Error::Invalid(format!(
                    "system '{}' is listed twice",
                    system.name
                )));
            }
        }
        let mut seen = HashSet::new();
        for variant in &self.variants {
            if variant.is_empty() || !seen.insert(variant.as_str()) {
                return Err(Error::Invalid(format!("variant '{variant}' is empty or duplicated")));
            }
        }
        let mut seen = HashSet::new();
        for flavour in &self.flavours {
            if !seen.insert(flavour.name.as_str()) {
                return Err(Error::Invalid(format!(
                    "flavour '{}' is listed twice",
                    flavour.name
                )));
            }
        }
        Ok(())
    }

    /// Jobset name for `branch` under `variant`. An empty variant yields the
    /// bare branch.
    pub fn jobset(&self, branch: &str, variant: &str) -> String {
        if variant.is_empty() {
            branch.to_string()
        } else {
            format!("{branch}-{variant}")
        }
    }

    /// Jobset whose evaluation supplies the job list: the branch under the
    /// first configured variant.
    pub fn base_jobset(&self, branch: &str) -> String {
        match self.variants.first() {
            Some(variant) => self.jobset(branch, variant),
            None => branch.to_string(),
        }
    }

    /// One entry per configured variant, or a single entry with an empty
    /// variant when none are configured.
    pub fn for_variants(&self, branch: &str) -> Vec<JobsetRef> {
        if self.variants.is_empty() {
            return vec![JobsetRef {
                jobset: branch.to_string(),
                variant: String::new(),
            }];
        }
        self.variants
            .iter()
            .map(|variant| JobsetRef {
                jobset: self.jobset(branch, variant),
                variant: variant.clone(),
            })
            .collect()
    }

    pub fn system_by_name(&self, name: &str) -> Option<&SystemAxis> {
        self.systems.iter().find(|system| system.name == name)
    }

    pub fn system_by_platform(&self, platform: &str) -> Option<&SystemAxis> {
        self.systems.iter().find(|system| system.platform == platform)
    }

    pub fn flavour_names(&self) -> Vec<&str> {
        self.flavours.iter().map(|flavour| flavour.name.as_str()).collect()
    }

    /// Glyph for an outcome token, `?` when the token is unknown.
    pub fn glyph(&self, outcome: &str) -> &str {
        self.outcomes.get(outcome).map(String::as_str).unwrap_or("?")
    }
}
