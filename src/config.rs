//! Configuration system for brightr with validation and default generation.
//!
//! This module provides configuration management for the brightr application,
//! handling the TOML-based configuration file, validation, and default value
//! generation.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Location]
//! latitude = 52.370216            # Geographic coordinates for solar elevation
//! longitude = 4.895168
//!
//! #[Brightness model]
//! half_life_minutes = 30          # Manual corrections halve over this time
//! step_percentage = 20.0          # Change per brightness keypress (percent)
//! minimum_step_percentage = 1.0   # Smallest visible change per keypress
//! baseline_curve = "nonnegative_sine"  # or "exp_sine"
//! max_overdrive_presses = 0       # Up presses allowed past full brightness
//!
//! #[Daemon]
//! poll_interval_secs = 5          # Seconds between solar re-basing polls
//! docked_brightness = 100.0       # Optional: pin brightness while docked
//! ```
//!
//! ## Validation and Error Handling
//!
//! All values are range-validated at load time; an invalid configuration is a
//! fatal startup error with a message naming the offending field and its
//! acceptable range. A non-positive half-life or step size can never reach
//! the model.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::brightness::{BaselineCurve, ModelParams};
use crate::constants::*;
use crate::logger::Log;

/// Configuration structure for brightr application settings.
///
/// Loaded from `brightr.toml`. Every field except the coordinates is optional
/// and falls back to a default from [`crate::constants`]. Coordinates are
/// required because solar elevation is meaningless without them.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Geographic latitude in degrees (-90 to +90).
    pub latitude: f64,
    /// Geographic longitude in degrees (-180 to +180).
    pub longitude: f64,
    /// Minutes for a manual correction to decay to half its value.
    pub half_life_minutes: Option<u64>,
    /// Percent change in perceived brightness per keypress.
    pub step_percentage: Option<f64>,
    /// Floor on the perceived change of a single keypress (percentage points).
    pub minimum_step_percentage: Option<f64>,
    /// Seconds between solar re-basing polls.
    pub poll_interval_secs: Option<u64>,
    /// Elevation-to-baseline mapping: "nonnegative_sine" or "exp_sine".
    pub baseline_curve: Option<String>,
    /// Perceived brightness (percent) to hold while an external display is
    /// connected. Absent disables the docked override.
    pub docked_brightness: Option<f64>,
    /// How many Up presses may push perceived brightness past 100%.
    pub max_overdrive_presses: Option<u32>,
}

impl Config {
    /// Path to the configuration file: `$XDG_CONFIG_HOME/brightr/brightr.toml`.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("brightr").join("brightr.toml"))
    }

    /// Load the configuration, creating a commented default file on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            Log::log_indented(&format!(
                "Created default configuration: {}",
                config_path.display()
            ));
        }

        Self::load_from_path(&config_path)
    }

    /// Load and validate the configuration from a specific path.
    ///
    /// Does not create a default config when the file is missing.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        validate_config(&config)?;

        Ok(config)
    }

    /// Create a default config file with placeholder coordinates.
    ///
    /// Amsterdam is the placeholder; users at other longitudes will notice the
    /// mismatch immediately from the startup sunrise/sunset diagnostics.
    pub fn create_default_config(path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_content = ConfigBuilder::new()
            .add_section("Location")
            .add_setting(
                "latitude",
                "52.370216",
                "Geographic latitude (-90 to 90 degrees)",
            )
            .add_setting(
                "longitude",
                "4.895168",
                "Geographic longitude (-180 to 180 degrees)",
            )
            .add_section("Brightness model")
            .add_setting(
                "half_life_minutes",
                &DEFAULT_HALF_LIFE_MINUTES.to_string(),
                &format!(
                    "Manual corrections halve over this many minutes ({}-{})",
                    MINIMUM_HALF_LIFE_MINUTES, MAXIMUM_HALF_LIFE_MINUTES
                ),
            )
            .add_setting(
                "step_percentage",
                &format!("{:.1}", DEFAULT_STEP_PERCENTAGE),
                &format!(
                    "Brightness change per keypress in percent ({}-{})",
                    MINIMUM_STEP_PERCENTAGE, MAXIMUM_STEP_PERCENTAGE
                ),
            )
            .add_setting(
                "minimum_step_percentage",
                &format!("{:.1}", DEFAULT_MINIMUM_STEP_PERCENTAGE),
                &format!(
                    "Smallest visible change per keypress ({}-{})",
                    MINIMUM_MINIMUM_STEP_PERCENTAGE, MAXIMUM_MINIMUM_STEP_PERCENTAGE
                ),
            )
            .add_setting(
                "baseline_curve",
                &format!("\"{}\"", DEFAULT_BASELINE_CURVE),
                "Select: \"nonnegative_sine\", \"exp_sine\"",
            )
            .add_setting(
                "max_overdrive_presses",
                &DEFAULT_MAX_OVERDRIVE_PRESSES.to_string(),
                &format!(
                    "Up presses allowed past full brightness (0-{})",
                    MAXIMUM_MAX_OVERDRIVE_PRESSES
                ),
            )
            .add_section("Daemon")
            .add_setting(
                "poll_interval_secs",
                &DEFAULT_POLL_INTERVAL.to_string(),
                &format!(
                    "Seconds between solar polls ({}-{})",
                    MINIMUM_POLL_INTERVAL, MAXIMUM_POLL_INTERVAL
                ),
            )
            .add_setting(
                "# docked_brightness",
                "100.0",
                "Uncomment to pin brightness while an external display is connected",
            )
            .build();

        fs::write(path, config_content).context("Failed to write default config file")?;
        Ok(())
    }

    // ═══ Accessors with defaults applied ═══

    pub fn half_life_minutes(&self) -> u64 {
        self.half_life_minutes.unwrap_or(DEFAULT_HALF_LIFE_MINUTES)
    }

    pub fn step_percentage(&self) -> f64 {
        self.step_percentage.unwrap_or(DEFAULT_STEP_PERCENTAGE)
    }

    pub fn minimum_step_percentage(&self) -> f64 {
        self.minimum_step_percentage
            .unwrap_or(DEFAULT_MINIMUM_STEP_PERCENTAGE)
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn baseline_curve(&self) -> BaselineCurve {
        self.baseline_curve
            .as_deref()
            .and_then(BaselineCurve::from_name)
            .unwrap_or(BaselineCurve::NonnegativeSine)
    }

    pub fn max_overdrive_presses(&self) -> u32 {
        self.max_overdrive_presses
            .unwrap_or(DEFAULT_MAX_OVERDRIVE_PRESSES)
    }

    /// Assemble the validated model parameters for [`crate::brightness::BrightnessModel`].
    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            step: self.step_percentage() / 100.0,
            minimum_step: self.minimum_step_percentage() / 100.0,
            half_life: Duration::minutes(self.half_life_minutes() as i64),
            curve: self.baseline_curve(),
            docked_override: self.docked_brightness.map(|percent| percent / 100.0),
            max_overdrive_presses: self.max_overdrive_presses(),
        }
    }

    /// Log the effective configuration at startup.
    pub fn log_config(&self) {
        let config_path = Self::get_config_path()
            .unwrap_or_else(|_| PathBuf::from("~/.config/brightr/brightr.toml"));

        Log::log_block_start(&format!(
            "Loaded configuration from {}",
            config_path.display()
        ));

        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        Log::log_indented(&format!(
            "Location: {:.4}°{}, {:.4}°{}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        ));
        Log::log_indented(&format!(
            "Correction half-life: {} minutes",
            self.half_life_minutes()
        ));
        Log::log_indented(&format!("Step size: {}%", self.step_percentage()));
        Log::log_indented(&format!(
            "Minimum step: {} percentage points",
            self.minimum_step_percentage()
        ));
        Log::log_indented(&format!(
            "Baseline curve: {}",
            self.baseline_curve().as_str()
        ));
        Log::log_indented(&format!(
            "Poll interval: {} seconds",
            self.poll_interval_secs()
        ));
        match self.docked_brightness {
            Some(percent) => Log::log_indented(&format!("Docked brightness: {}%", percent)),
            None => Log::log_indented("Docked brightness: disabled"),
        }
        if self.max_overdrive_presses() > 0 {
            Log::log_indented(&format!(
                "Overdrive presses: {}",
                self.max_overdrive_presses()
            ));
        }
    }
}

/// Comprehensive configuration validation to prevent impossible setups.
pub fn validate_config(config: &Config) -> Result<()> {
    // Coordinate ranges
    if !(-90.0..=90.0).contains(&config.latitude) {
        anyhow::bail!(
            "Latitude must be between -90 and 90 degrees (got {})",
            config.latitude
        );
    }
    if !(-180.0..=180.0).contains(&config.longitude) {
        anyhow::bail!(
            "Longitude must be between -180 and 180 degrees (got {})",
            config.longitude
        );
    }

    // Half-life must be positive and sane; zero would divide the decay factor
    if let Some(half_life) = config.half_life_minutes {
        if !(MINIMUM_HALF_LIFE_MINUTES..=MAXIMUM_HALF_LIFE_MINUTES).contains(&half_life) {
            anyhow::bail!(
                "Correction half-life must be between {} and {} minutes (got {})",
                MINIMUM_HALF_LIFE_MINUTES,
                MAXIMUM_HALF_LIFE_MINUTES,
                half_life
            );
        }
    }

    if let Some(step) = config.step_percentage {
        if !(MINIMUM_STEP_PERCENTAGE..=MAXIMUM_STEP_PERCENTAGE).contains(&step) {
            anyhow::bail!(
                "Step percentage must be between {}% and {}% (got {})",
                MINIMUM_STEP_PERCENTAGE,
                MAXIMUM_STEP_PERCENTAGE,
                step
            );
        }
    }

    if let Some(minimum_step) = config.minimum_step_percentage {
        if !(MINIMUM_MINIMUM_STEP_PERCENTAGE..=MAXIMUM_MINIMUM_STEP_PERCENTAGE)
            .contains(&minimum_step)
        {
            anyhow::bail!(
                "Minimum step must be between {} and {} percentage points (got {})",
                MINIMUM_MINIMUM_STEP_PERCENTAGE,
                MAXIMUM_MINIMUM_STEP_PERCENTAGE,
                minimum_step
            );
        }
    }

    if let Some(interval) = config.poll_interval_secs {
        if !(MINIMUM_POLL_INTERVAL..=MAXIMUM_POLL_INTERVAL).contains(&interval) {
            anyhow::bail!(
                "Poll interval must be between {} and {} seconds (got {})",
                MINIMUM_POLL_INTERVAL,
                MAXIMUM_POLL_INTERVAL,
                interval
            );
        }
    }

    if let Some(ref curve) = config.baseline_curve {
        if BaselineCurve::from_name(curve).is_none() {
            anyhow::bail!(
                "Baseline curve must be 'nonnegative_sine' or 'exp_sine' (got '{}')",
                curve
            );
        }
    }

    if let Some(docked) = config.docked_brightness {
        if !(MINIMUM_DOCKED_BRIGHTNESS..=MAXIMUM_DOCKED_BRIGHTNESS).contains(&docked) {
            anyhow::bail!(
                "Docked brightness must be between {}% and {}% (got {})",
                MINIMUM_DOCKED_BRIGHTNESS,
                MAXIMUM_DOCKED_BRIGHTNESS,
                docked
            );
        }
    }

    if let Some(presses) = config.max_overdrive_presses {
        if presses > MAXIMUM_MAX_OVERDRIVE_PRESSES {
            anyhow::bail!(
                "Overdrive presses must be at most {} (got {})",
                MAXIMUM_MAX_OVERDRIVE_PRESSES,
                presses
            );
        }
    }

    Ok(())
}

/// Builder for creating dynamically-aligned configuration files.
///
/// This builder maintains proper comment alignment by calculating the maximum
/// width of all setting lines and applying consistent padding, so the default
/// config stays formatted when constants change.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

#[derive(Clone)]
struct ConfigEntry {
    content: String,
    entry_type: EntryType,
}

#[derive(Clone)]
enum EntryType {
    Section,
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: format!("#[{}]", title),
            entry_type: EntryType::Section,
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        let line = format!("{} = {}", key, value);
        self.entries.push(ConfigEntry {
            content: line.clone(),
            entry_type: EntryType::Setting {
                line,
                comment: format!("# {}", comment),
            },
        });
        self
    }

    fn build(self) -> String {
        // Calculate the maximum width of all setting lines for alignment
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.entry_type {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // +1 for one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry.entry_type {
                EntryType::Section => {
                    if !first_section {
                        result.push(String::new()); // Empty line before new section
                    }
                    result.push(entry.content);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        toml::from_str("latitude = 52.37\nlongitude = 4.89\n").unwrap()
    }

    #[test]
    fn minimal_config_passes_validation_with_defaults() {
        let config = minimal_config();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.half_life_minutes(), DEFAULT_HALF_LIFE_MINUTES);
        assert_eq!(config.step_percentage(), DEFAULT_STEP_PERCENTAGE);
        assert_eq!(config.poll_interval_secs(), DEFAULT_POLL_INTERVAL);
        assert_eq!(config.baseline_curve(), BaselineCurve::NonnegativeSine);
        assert!(config.docked_brightness.is_none());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut config = minimal_config();
        config.latitude = 95.0;
        assert!(validate_config(&config).is_err());

        let mut config = minimal_config();
        config.longitude = -200.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_nonpositive_half_life() {
        let mut config = minimal_config();
        config.half_life_minutes = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_bad_step_sizes() {
        let mut config = minimal_config();
        config.step_percentage = Some(0.0);
        assert!(validate_config(&config).is_err());

        let mut config = minimal_config();
        config.step_percentage = Some(150.0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_unknown_baseline_curve() {
        let mut config = minimal_config();
        config.baseline_curve = Some("linear".to_string());
        assert!(validate_config(&config).is_err());

        let mut config = minimal_config();
        config.baseline_curve = Some("exp_sine".to_string());
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.baseline_curve(), BaselineCurve::ExpSine);
    }

    #[test]
    fn rejects_out_of_range_docked_brightness() {
        let mut config = minimal_config();
        config.docked_brightness = Some(120.0);
        assert!(validate_config(&config).is_err());

        let mut config = minimal_config();
        config.docked_brightness = Some(100.0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn model_params_convert_percentages_to_fractions() {
        let mut config = minimal_config();
        config.step_percentage = Some(10.0);
        config.minimum_step_percentage = Some(1.0);
        config.docked_brightness = Some(100.0);
        let params = config.model_params();
        assert_eq!(params.step, 0.1);
        assert_eq!(params.minimum_step, 0.01);
        assert_eq!(params.docked_override, Some(1.0));
        assert_eq!(params.half_life, Duration::minutes(30));
    }

    #[test]
    fn default_config_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brightr.toml");
        Config::create_default_config(&path).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert!((config.latitude - 52.370216).abs() < 1e-9);
        assert_eq!(config.half_life_minutes(), DEFAULT_HALF_LIFE_MINUTES);
        // The docked override ships commented out
        assert!(config.docked_brightness.is_none());
    }
}
