//! Decoding of job and test identifiers.
//!
//! Hydra job identifiers encode their target platform after the first dot
//! (`rpm.x86_64-linux`). Test identifiers in result manifests are paths
//! (`shell/lvcreate.sh`). These helpers recover structured coordinates and
//! compact display names from both.

use hm_config::{Abbreviation, HmConfig, TestNaming};

use crate::models::Job;

const PLATFORM_MARKER: &str = "-linux";

/// Split a job identifier into its base name and target system.
///
/// Identifiers without a dot, or with nothing after it, carry no system.
/// Everything after the first dot is the platform, so `a.b.x86_64-linux`
/// decodes to system `b.x86_64`.
pub fn decode_job(path: &str) -> Job {
    let Some((name, platform)) = path.split_once('.') else {
        return Job {
            name: path.to_string(),
            path: path.to_string(),
            system: None,
            platform: None,
        };
    };
    if platform.is_empty() {
        return Job {
            name: name.to_string(),
            path: path.to_string(),
            system: None,
            platform: None,
        };
    }

    let mut system = platform.replacen(PLATFORM_MARKER, "", 1);
    let mut platform = platform.to_string();
    if system == "i386" {
        system = String::from("i686");
        platform = platform.replacen("i386", "i686", 1);
    }
    Job {
        name: name.to_string(),
        path: path.to_string(),
        system: Some(system),
        platform: Some(platform),
    }
}

/// Shorten a job name for a column header.
///
/// Each rule rewrites the first occurrence of its pattern; an empty name
/// becomes `?`.
pub fn abbreviate_name(name: &str, rules: &[Abbreviation]) -> String {
    if name.is_empty() {
        return String::from("?");
    }
    rules
        .iter()
        .fold(name.to_string(), |name, rule| name.replacen(&rule.from, &rule.to, 1))
}

/// Compact label of a system, looked up by platform or by short name.
/// Unknown systems are returned unchanged.
pub fn abbreviate_system(system: &str, config: &HmConfig) -> String {
    config
        .system_by_platform(system)
        .or_else(|| config.system_by_name(system))
        .map(|axis| axis.label.clone())
        .unwrap_or_else(|| system.to_string())
}

/// Flat row key of a test: the first path separator and the first dot
/// become `_`. Not unique; rows are indexed by the raw test identifier.
pub fn test_row_key(test_id: &str) -> String {
    test_id.replacen('/', "_", 1).replacen('.', "_", 1)
}

/// File name of a test's result log: the first path separator becomes `_`.
pub fn result_file_name(test_id: &str) -> String {
    test_id.replacen('/', "_", 1)
}

/// Human-readable test name with the configured prefix and suffix removed.
pub fn test_display_name(test_id: &str, naming: &TestNaming) -> String {
    let name = test_id.replacen(&naming.strip_prefix, "", 1);
    match name.strip_suffix(naming.strip_suffix.as_str()) {
        Some(stripped) if !naming.strip_suffix.is_empty() => stripped.to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_job_with_platform() {
        let job = decode_job("foo.x86_64-linux");
        assert_eq!(job.name, "foo");
        assert_eq!(job.path, "foo.x86_64-linux");
        assert_eq!(job.system.as_deref(), Some("x86_64"));
        assert_eq!(job.platform.as_deref(), Some("x86_64-linux"));
    }

    #[test]
    fn decode_job_normalizes_i386() {
        let job = decode_job("foo.i386-linux");
        assert_eq!(job.name, "foo");
        assert_eq!(job.system.as_deref(), Some("i686"));
        assert_eq!(job.platform.as_deref(), Some("i686-linux"));
    }

    #[test]
    fn decode_job_without_dot() {
        let job = decode_job("bar");
        assert_eq!(job.name, "bar");
        assert_eq!(job.path, "bar");
        assert_eq!(job.system, None);
        assert_eq!(job.platform, None);
    }

    #[test]
    fn decode_job_with_trailing_dot() {
        let job = decode_job("bar.");
        assert_eq!(job.name, "bar");
        assert_eq!(job.system, None);
    }

    #[test]
    fn decode_job_with_several_dots() {
        let job = decode_job("rpm.fc20.x86_64-linux");
        assert_eq!(job.name, "rpm");
        assert_eq!(job.system.as_deref(), Some("fc20.x86_64"));
    }

    #[test]
    fn decode_job_without_marker() {
        let job = decode_job("vm.x86_64-darwin");
        assert_eq!(job.system.as_deref(), Some("x86_64-darwin"));
        assert_eq!(job.platform.as_deref(), Some("x86_64-darwin"));
    }

    #[test]
    fn abbreviate_name_applies_rules() {
        let config = HmConfig::new("http://h", "p");
        assert_eq!(
            abbreviate_name("fedora_rawhide_x86_64", &config.abbreviations),
            "fc_rhide 64"
        );
        assert_eq!(abbreviate_name("ubuntu_i386", &config.abbreviations), "ub 32");
        assert_eq!(
            abbreviate_name("clang_hashcompaction_small", &config.abbreviations),
            "c hcs"
        );
        assert_eq!(abbreviate_name("", &config.abbreviations), "?");
        assert_eq!(abbreviate_name("plain", &[]), "plain");
    }

    #[test]
    fn abbreviate_system_uses_labels() {
        let config = HmConfig::new("http://h", "p");
        assert_eq!(abbreviate_system("x86_64-linux", &config), "64");
        assert_eq!(abbreviate_system("i686", &config), "32");
        assert_eq!(abbreviate_system("aarch64-linux", &config), "aarch64-linux");
    }

    #[test]
    fn test_identifiers() {
        let naming = TestNaming::default();
        assert_eq!(test_row_key("shell/foo.sh"), "shell_foo_sh");
        assert_eq!(test_row_key("shell/a/b.sh"), "shell_a/b_sh");
        assert_eq!(test_row_key("shell/a_b.sh"), "shell_a_b_sh");
        assert_eq!(result_file_name("shell/sub/foo.sh"), "shell_sub/foo.sh");
        assert_eq!(test_display_name("shell/foo.sh", &naming), "foo");
        assert_eq!(test_display_name("api/vg.t", &naming), "api/vg.t");
    }
}
