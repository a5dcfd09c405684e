//! Parser for the per-build test-result manifest.
//!
//! The manifest is plain text, one test per line:
//!
//! ```text
//! normal:shell/lvcreate.sh passed
//! cluster:shell/lvcreate.sh skipped
//! ```
//!
//! The `flavour:` prefix is present only when the project is tested in
//! several flavours. Lines that do not have this shape are ignored.

use hm_config::HmConfig;
use serde::{Deserialize, Serialize};

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    /// `None` for unflavoured manifests and for an empty `:` prefix.
    pub flavour: Option<String>,
    pub test_id: String,
    /// Outcome token, e.g. `passed` or `failed`.
    pub outcome: String,
}

/// Parse one manifest line.
///
/// With `flavoured` set the test identifier must be preceded by
/// `flavour:`; the flavour ends at the first colon.
pub fn parse_line(line: &str, flavoured: bool) -> Option<TestRecord> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    let (head, outcome) = line.split_once(' ')?;

    let (flavour, test_id) = if flavoured {
        let (flavour, test_id) = head.split_once(':')?;
        let flavour = (!flavour.is_empty()).then(|| flavour.to_string());
        (flavour, test_id)
    } else {
        (None, head)
    };
    if test_id.is_empty() {
        return None;
    }

    Some(TestRecord {
        flavour,
        test_id: test_id.to_string(),
        outcome: outcome.to_string(),
    })
}

/// Parse a whole manifest, skipping lines that do not match.
pub fn parse_manifest(text: &str, flavoured: bool) -> Vec<TestRecord> {
    text.lines()
        .filter_map(|line| parse_line(line, flavoured))
        .collect()
}

/// Single-character glyph for an outcome token.
pub fn glyph_for<'a>(config: &'a HmConfig, outcome: &str) -> &'a str {
    config.glyph(outcome)
}
