//! Links to build pages and build products on the CI server.

use crate::models::RecordId;

/// URL builder rooted at the CI server's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    base: String,
}

impl Links {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn build(&self, build: RecordId) -> String {
        format!("{}/build/{build}", self.base)
    }

    /// Result log of a single test. `file` is the test identifier as
    /// produced by [`crate::ident::result_file_name`].
    pub fn test_result(&self, build: RecordId, flavour: Option<&str>, file: &str) -> String {
        match flavour {
            Some(flavour) => format!(
                "{}/build/{build}/download/1/test-results/{flavour}:{file}.txt",
                self.base
            ),
            None => format!("{}/build/{build}/download/1/test-results/{file}.txt", self.base),
        }
    }

    pub fn coverage(&self, build: RecordId) -> String {
        format!("{}/build/{build}/download/2/coverage", self.base)
    }

    pub fn raw_log(&self, build: RecordId) -> String {
        format!("{}/build/{build}/log/raw", self.base)
    }
}
