//! Application constants and default values for brightr.
//!
//! This module contains all the configuration defaults, validation limits,
//! and operational constants used throughout the application.

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_HALF_LIFE_MINUTES: u64 = 30; // minutes for a manual correction to halve
pub const DEFAULT_STEP_PERCENTAGE: f64 = 20.0; // percent change per brightness keypress
pub const DEFAULT_MINIMUM_STEP_PERCENTAGE: f64 = 1.0; // floor so every keypress is visible
pub const DEFAULT_POLL_INTERVAL: u64 = 5; // seconds between solar re-basing polls
pub const DEFAULT_BASELINE_CURVE: &str = "nonnegative_sine"; // elevation-to-brightness mapping
pub const DEFAULT_MAX_OVERDRIVE_PRESSES: u32 = 0; // extra Up presses allowed past 100%

// ═══ brightnessctl Compatibility ═══
// Version requirements and compatibility information

pub const REQUIRED_BRIGHTNESSCTL_VERSION: &str = "v0.5.0"; // Minimum required version
pub const COMPATIBLE_BRIGHTNESSCTL_VERSIONS: &[&str] = &[
    "v0.5.0",
    "v0.5.1",
    // Add more versions as they become available and tested
];

// ═══ Validation Limits ═══
// These limits ensure user inputs are within reasonable and safe ranges

// Half-life limits
pub const MINIMUM_HALF_LIFE_MINUTES: u64 = 1; // below this, corrections vanish before they register
pub const MAXIMUM_HALF_LIFE_MINUTES: u64 = 720; // 12 hours - effectively permanent corrections

// Step size limits (percent per keypress)
pub const MINIMUM_STEP_PERCENTAGE: f64 = 1.0;
pub const MAXIMUM_STEP_PERCENTAGE: f64 = 100.0; // doubling per press

// Minimum-step floor limits (percentage points)
pub const MINIMUM_MINIMUM_STEP_PERCENTAGE: f64 = 0.1;
pub const MAXIMUM_MINIMUM_STEP_PERCENTAGE: f64 = 10.0;

// Poll interval limits
pub const MINIMUM_POLL_INTERVAL: u64 = 1; // seconds (prevents excessive CPU usage)
pub const MAXIMUM_POLL_INTERVAL: u64 = 300; // 5 minutes max for responsive tracking

// Docked brightness limits (percent of full backlight)
pub const MINIMUM_DOCKED_BRIGHTNESS: f64 = 0.0;
pub const MAXIMUM_DOCKED_BRIGHTNESS: f64 = 100.0;

// Overdrive limits
pub const MAXIMUM_MAX_OVERDRIVE_PRESSES: u32 = 5;

// ═══ Operational Timing Constants ═══
// Internal timing values for application operation

pub const CHECK_INTERVAL_SECS: u64 = 1; // How often the sleep wakes to check signals and the running flag

// ═══ Exit Codes ═══
// Standard exit codes for process termination

pub const EXIT_FAILURE: i32 = 1; // General failure (includes lock contention)
