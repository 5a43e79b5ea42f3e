//! Backlight actuator built on the brightnessctl command-line tool.
//!
//! The core model only hands this module a physical power fraction; the
//! conversion to a percentage and the invocation of the external tool live
//! here. A failed set is an actuator error the caller logs and survives - the
//! next poll retries with a fresh value.

use anyhow::{Context, Result};

use crate::constants::*;
use crate::logger::Log;
use crate::utils::{compare_versions, extract_version_from_output};

/// Verify that brightnessctl is installed and check version compatibility.
///
/// This performs both installation verification and version checking in a
/// single step:
/// 1. Check if the brightnessctl command exists
/// 2. Extract version information from output
/// 3. Validate version compatibility against requirements
///
/// # Returns
/// - `Ok(())` if brightnessctl is installed and compatible
/// - `Err` with detailed error message if issues are found
pub fn verify_brightnessctl_installed_and_version() -> Result<()> {
    match std::process::Command::new("brightnessctl")
        .arg("--version")
        .output()
    {
        Ok(output) => {
            // Check both stdout and stderr for version info
            let version_output = if !output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stdout)
            } else {
                String::from_utf8_lossy(&output.stderr)
            };

            if let Some(version) = extract_version_from_output(&version_output) {
                Log::log_decorated(&format!("Found brightnessctl {}", version));

                if is_version_compatible(&version) {
                    Ok(())
                } else {
                    anyhow::bail!(
                        "brightnessctl {} is not compatible with brightr.\n\
                        Required minimum version: {}\n\
                        Compatible versions: {}\n\
                        Please update brightnessctl to a compatible version.",
                        version,
                        REQUIRED_BRIGHTNESSCTL_VERSION,
                        COMPATIBLE_BRIGHTNESSCTL_VERSIONS.join(", ")
                    )
                }
            } else {
                Log::log_warning("Could not parse version from brightnessctl output");
                Log::log_decorated("Attempting to proceed anyway...");
                Ok(())
            }
        }
        Err(_) => {
            // brightnessctl command failed - check if it's installed at all
            match std::process::Command::new("which")
                .arg("brightnessctl")
                .output()
            {
                Ok(which_output) if which_output.status.success() => {
                    Log::log_warning("brightnessctl found but version check failed");
                    Log::log_decorated("This might be an older version. Proceeding anyway...");
                    Ok(())
                }
                _ => anyhow::bail!("brightnessctl is not installed on the system"),
            }
        }
    }
}

/// Check if a brightnessctl version is compatible with brightr.
///
/// Checks against an explicit compatibility list first, then falls back to
/// semantic version comparison if not found.
fn is_version_compatible(version: &str) -> bool {
    if COMPATIBLE_BRIGHTNESSCTL_VERSIONS.contains(&version) {
        return true;
    }

    compare_versions(version, REQUIRED_BRIGHTNESSCTL_VERSION) >= std::cmp::Ordering::Equal
}

/// Convert a physical power fraction into the percentage brightnessctl takes.
///
/// The model guarantees the fraction is within `[0, max_perceived²]`; with
/// overdrive enabled that can exceed 1.0, which the hardware cannot express,
/// so the percentage saturates at 100.
pub fn power_to_percent(fraction: f64) -> u32 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Push a physical backlight power fraction to the hardware.
///
/// Invokes `brightnessctl set N%`. Failures are returned to the caller, which
/// logs and continues; a transient external failure should not terminate the
/// daemon.
pub fn set_backlight_power(fraction: f64) -> Result<()> {
    let percent = power_to_percent(fraction);
    let output = std::process::Command::new("brightnessctl")
        .args(["--quiet", "set", &format!("{}%", percent)])
        .output()
        .context("failed to execute brightnessctl")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("brightnessctl set {}% failed: {}", percent, stderr.trim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_to_percent_range() {
        assert_eq!(power_to_percent(0.0), 0);
        assert_eq!(power_to_percent(0.25), 25);
        assert_eq!(power_to_percent(1.0), 100);
    }

    #[test]
    fn test_power_to_percent_rounds() {
        assert_eq!(power_to_percent(0.3025), 30); // 0.55 perceived squared
        assert_eq!(power_to_percent(0.005), 1);
        assert_eq!(power_to_percent(0.004), 0);
    }

    #[test]
    fn test_power_to_percent_saturates_overdrive() {
        // max_perceived 1.21 squared is 1.4641
        assert_eq!(power_to_percent(1.4641), 100);
    }

    #[test]
    fn test_version_compatibility() {
        assert!(is_version_compatible("v0.5.0"));
        assert!(is_version_compatible("v0.5.1"));
        assert!(is_version_compatible("v0.6.2"));
        assert!(!is_version_compatible("v0.4.9"));
    }
}
