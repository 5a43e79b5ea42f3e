//! # Brightr
//!
//! Automatic backlight brightness for Linux laptops.
//!
//! Brightr continuously matches the display backlight to ambient daylight,
//! inferred from solar elevation at a configured location, while letting the
//! user nudge brightness with signals. Manual corrections exponentially decay
//! back toward the astronomical baseline.
//!
//! ## Architecture
//!
//! - **args**: Command-line argument parsing
//! - **backlight**: brightnessctl actuator and version verification
//! - **brightness**: The decaying-offset brightness model (the core)
//! - **config**: Configuration loading, validation, and default generation
//! - **constants**: Application-wide constants and defaults
//! - **display**: External display detection via sysfs DRM connectors
//! - **logger**: Structured logging with visual formatting
//! - **signals**: Signal thread mapping SIGUSR1/SIGUSR2 to brightness bumps
//! - **solar**: Solar elevation and sunrise/sunset calculations
//! - **utils**: Version parsing helpers

pub mod args;
pub mod backlight;
pub mod brightness;
pub mod config;
pub mod constants;
pub mod display;
pub mod logger;
pub mod signals;
pub mod solar;
pub mod utils;

// Re-export important types for easier access
pub use brightness::{BaselineCurve, BrightnessModel, BumpDirection, DecayingValue, ModelParams};
pub use config::Config;
pub use logger::{Log, LogLevel};
