//! Configuration module for the quarter planner

use crate::core::scheduler::{DebtCarry, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Variable expanded to the config directory in path values
const DIR_VARIABLE: &str = "$QUARTER_PLANNER";

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Scheduler settings; unset values fall back to the built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Maximum units per quarter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cap: Option<f32>,
    /// Quarter ceiling for the search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quarters: Option<usize>,
    /// Packings explored per quarter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_factor: Option<usize>,
    /// Eligible courses considered per quarter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<usize>,
    /// Expanded-state budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<usize>,
    /// Debt policy: "reset" or "rollover"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_carry: Option<String>,
    /// Largest credit carried into a quarter under "rollover"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rollover: Option<f32>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

/// Optional per-run overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override unit cap
    pub unit_cap: Option<f32>,
    /// Override quarter ceiling
    pub max_quarters: Option<usize>,
    /// Override expansion budget
    pub max_expansions: Option<usize>,
}

impl Config {
    /// Get the `$QUARTER_PLANNER` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/quarterplanner`
    /// - macOS: `~/Library/Application Support/quarterplanner`
    /// - Windows: `%APPDATA%\quarterplanner`
    #[must_use]
    pub fn get_planner_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quarterplanner")
    }

    /// Get the user config file path
    ///
    /// - `config.toml` for release builds
    /// - `dconfig.toml` for debug builds (allows separate debug config)
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_planner_dir().join(CONFIG_FILE_NAME)
    }

    /// Replace `$QUARTER_PLANNER` with the config directory
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_planner_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing sections and fields use their serde defaults. `$QUARTER_PLANNER`
    /// in the log file path is expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.logging.file = Self::expand_variables(&config.logging.file);
        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled in and covered by tests.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from the user config file, or create it from defaults
    ///
    /// - If the file exists: loads it, merges missing fields from defaults and
    ///   saves the result when anything was added
    /// - Otherwise: saves the defaults to the file and returns them
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if !config_file.exists() {
            if let Err(e) = defaults.save_to(&config_file) {
                logger::warn!(target: "config", "Could not write default config: {e}");
            }
            return defaults;
        }

        match Self::load_from(&config_file) {
            Ok(mut config) => {
                if config.merge_defaults(&defaults) {
                    if let Err(e) = config.save_to(&config_file) {
                        logger::warn!(target: "config", "Could not update config: {e}");
                    }
                }
                config
            }
            Err(e) => {
                logger::warn!(target: "config", "Ignoring unreadable config: {e}");
                defaults
            }
        }
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Save configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_file_path())
    }

    /// Save configuration to a specific file, creating its directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the config cannot
    /// be serialized or the file cannot be written
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty (or unset) here and set in `defaults` are
    /// updated, so user settings survive upgrades that add new fields.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        let ours = &mut self.scheduler;
        let theirs = &defaults.scheduler;
        changed |= fill(&mut ours.unit_cap, theirs.unit_cap);
        changed |= fill(&mut ours.max_quarters, theirs.max_quarters);
        changed |= fill(&mut ours.branch_factor, theirs.branch_factor);
        changed |= fill(&mut ours.max_candidates, theirs.max_candidates);
        changed |= fill(&mut ours.max_expansions, theirs.max_expansions);
        changed |= fill(&mut ours.debt_carry, theirs.debt_carry.clone());
        changed |= fill(&mut ours.max_rollover, theirs.max_rollover);

        changed
    }

    /// Apply per-run overrides without touching the saved file
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(unit_cap) = overrides.unit_cap {
            self.scheduler.unit_cap = Some(unit_cap);
        }
        if let Some(max_quarters) = overrides.max_quarters {
            self.scheduler.max_quarters = Some(max_quarters);
        }
        if let Some(max_expansions) = overrides.max_expansions {
            self.scheduler.max_expansions = Some(max_expansions);
        }
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `unit_cap`, `max_quarters`,
    /// `branch_factor`, `max_candidates`, `max_expansions`, `debt_carry`,
    /// `max_rollover` (dashes are accepted in place of underscores).
    ///
    /// # Returns
    /// - `Some(String)`: The value as a string (empty when unset)
    /// - `None`: If the key is not recognized
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let s = &self.scheduler;
        let value = match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone(),
            "file" => self.logging.file.clone(),
            "verbose" => self.logging.verbose.to_string(),
            "unit_cap" => show(s.unit_cap),
            "max_quarters" => show(s.max_quarters),
            "branch_factor" => show(s.branch_factor),
            "max_candidates" => show(s.max_candidates),
            "max_expansions" => show(s.max_expansions),
            "debt_carry" => s.debt_carry.clone().unwrap_or_default(),
            "max_rollover" => show(s.max_rollover),
            _ => return None,
        };
        Some(value)
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config. Call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be
    /// parsed for that key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let s = &mut self.scheduler;
        match key.replace('-', "_").as_str() {
            "level" => {
                value
                    .parse::<logger::Level>()
                    .map_err(|e| format!("Invalid value for 'level': {e}"))?;
                self.logging.level = value.to_string();
            }
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "unit_cap" => s.unit_cap = Some(parse_value(key, value)?),
            "max_quarters" => s.max_quarters = Some(parse_value(key, value)?),
            "branch_factor" => s.branch_factor = Some(parse_value(key, value)?),
            "max_candidates" => s.max_candidates = Some(parse_value(key, value)?),
            "max_expansions" => s.max_expansions = Some(parse_value(key, value)?),
            "debt_carry" => {
                parse_debt_carry(value, 0.0)?;
                s.debt_carry = Some(value.to_ascii_lowercase());
            }
            "max_rollover" => s.max_rollover = Some(parse_value(key, value)?),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset a single value to its default
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        let s = &mut self.scheduler;
        let d = &defaults.scheduler;
        match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "unit_cap" => s.unit_cap = d.unit_cap,
            "max_quarters" => s.max_quarters = d.max_quarters,
            "branch_factor" => s.branch_factor = d.branch_factor,
            "max_candidates" => s.max_candidates = d.max_candidates,
            "max_expansions" => s.max_expansions = d.max_expansions,
            "debt_carry" => s.debt_carry.clone_from(&d.debt_carry),
            "max_rollover" => s.max_rollover = d.max_rollover,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Delete the user config file; the next [`load()`](Config::load)
    /// recreates it from defaults
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }

    /// Build the scheduler settings, using built-in defaults for unset values
    ///
    /// # Errors
    /// Returns an error if `debt_carry` is not "reset" or "rollover"
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, String> {
        let s = &self.scheduler;
        let defaults = SchedulerConfig::default();
        let debt_carry = match &s.debt_carry {
            Some(policy) => parse_debt_carry(policy, s.max_rollover.unwrap_or(0.0))?,
            None => defaults.debt_carry,
        };

        Ok(SchedulerConfig {
            unit_cap: s.unit_cap.unwrap_or(defaults.unit_cap),
            max_quarters: s.max_quarters.unwrap_or(defaults.max_quarters),
            branch_factor: s.branch_factor.unwrap_or(defaults.branch_factor),
            max_candidates: s.max_candidates.unwrap_or(defaults.max_candidates),
            max_expansions: s.max_expansions.or(defaults.max_expansions),
            debt_carry,
            ..defaults
        })
    }
}

fn fill<T>(slot: &mut Option<T>, default: Option<T>) -> bool {
    if slot.is_none() && default.is_some() {
        *slot = default;
        true
    } else {
        false
    }
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("Invalid value for '{key}': '{value}'"))
}

fn parse_debt_carry(policy: &str, max_rollover: f32) -> Result<DebtCarry, String> {
    match policy.trim().to_ascii_lowercase().as_str() {
        "reset" => Ok(DebtCarry::Reset),
        "rollover" => Ok(DebtCarry::Rollover { max_rollover }),
        other => Err(format!(
            "Invalid value for 'debt_carry': '{other}' (expected reset or rollover)"
        )),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        let s = &self.scheduler;
        writeln!(f, "\n[scheduler]")?;
        writeln!(f, "  unit_cap = {}", show(s.unit_cap))?;
        writeln!(f, "  max_quarters = {}", show(s.max_quarters))?;
        writeln!(f, "  branch_factor = {}", show(s.branch_factor))?;
        writeln!(f, "  max_candidates = {}", show(s.max_candidates))?;
        writeln!(f, "  max_expansions = {}", show(s.max_expansions))?;
        writeln!(
            f,
            "  debt_carry = \"{}\"",
            s.debt_carry.as_deref().unwrap_or_default()
        )?;
        writeln!(f, "  max_rollover = {}", show(s.max_rollover))?;

        Ok(())
    }
}
