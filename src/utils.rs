//! Utility functions shared across the codebase.
//!
//! Version parsing and comparison helpers used when verifying the backlight
//! tool at startup.

/// Simple semantic version comparison for version strings.
///
/// Compares version strings in the format "vX.Y.Z" or "X.Y.Z" using
/// semantic versioning rules. Handles the optional 'v' prefix automatically.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use brightr::utils::compare_versions;
/// assert_eq!(compare_versions("v0.4.0", "v0.5.0"), Ordering::Less);
/// assert_eq!(compare_versions("0.5.1", "v0.5.0"), Ordering::Greater);
/// ```
pub fn compare_versions(version1: &str, version2: &str) -> std::cmp::Ordering {
    let parse_version = |v: &str| -> Vec<u32> {
        v.trim_start_matches('v')
            .split('.')
            .filter_map(|s| s.parse().ok())
            .collect()
    };

    let v1 = parse_version(version1);
    let v2 = parse_version(version2);

    v1.cmp(&v2)
}

/// Extract a semantic version string from backlight tool output.
///
/// Parses command output to find version information in various formats.
/// Handles both "vX.Y.Z" and "X.Y.Z" patterns and normalizes to "vX.Y.Z".
///
/// # Examples
/// ```
/// use brightr::utils::extract_version_from_output;
/// assert_eq!(extract_version_from_output("brightnessctl 0.5.1"), Some("v0.5.1".to_string()));
/// assert_eq!(extract_version_from_output("version: v0.5.0"), Some("v0.5.0".to_string()));
/// ```
pub fn extract_version_from_output(output: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        if let Some(version) = extract_semver_from_line(line) {
            return Some(version);
        }
    }
    None
}

/// Extract a semantic version from a single line of text using regex.
fn extract_semver_from_line(line: &str) -> Option<String> {
    use regex::Regex;
    let re = Regex::new(r"v?(\d+\.\d+\.\d+)").ok()?;
    if let Some(captures) = re.captures(line) {
        let full_match = captures.get(0)?.as_str();
        if full_match.starts_with('v') {
            Some(full_match.to_string())
        } else {
            Some(format!("v{}", captures.get(1)?.as_str()))
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_compare_versions_basic() {
        assert_eq!(compare_versions("v0.5.0", "v0.5.0"), Ordering::Equal);
        assert_eq!(compare_versions("v0.4.0", "v0.5.0"), Ordering::Less);
        assert_eq!(compare_versions("v0.6.0", "v0.5.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_mixed_prefix() {
        assert_eq!(compare_versions("0.5.0", "v0.5.1"), Ordering::Less);
        assert_eq!(compare_versions("v0.5.2", "0.5.1"), Ordering::Greater);
    }

    #[test]
    fn test_extract_version_from_output_brightnessctl_format() {
        assert_eq!(
            extract_version_from_output("brightnessctl 0.5.1"),
            Some("v0.5.1".to_string())
        );
        assert_eq!(
            extract_version_from_output("brightnessctl v0.5.1"),
            Some("v0.5.1".to_string())
        );
    }

    #[test]
    fn test_extract_version_from_output_multiline() {
        let output = "brightnessctl - read and control device brightness\nversion: v0.5.1\nother info";
        assert_eq!(extract_version_from_output(output), Some("v0.5.1".to_string()));
    }

    #[test]
    fn test_extract_version_from_output_no_version() {
        assert_eq!(extract_version_from_output("no version info here"), None);
        assert_eq!(extract_version_from_output(""), None);
    }

    #[test]
    fn test_extract_version_from_output_malformed() {
        assert_eq!(extract_version_from_output("version 1.0"), None);
        assert_eq!(
            extract_version_from_output("v0.5.0.0"),
            Some("v0.5.0".to_string())
        );
    }
}
