//! Re-export of the `logger` crate plus setup from the `[logging]` config
//! section.

pub use logger::{
    close_file_logging, current_level, disable_debug, disable_verbose, enable_debug,
    enable_verbose, init_file_logging, is_debug_enabled, is_verbose_enabled, set_level,
    set_level_from_str, Level, ParseLevelError,
};

use crate::core::config::LoggingConfig;
use std::path::Path;

/// Apply a `[logging]` section to the global logger
///
/// Unknown or empty levels fall back to `warn`. A non-empty `file` starts
/// file logging; failure to open it is reported on stderr and logging stays
/// on the console.
///
/// # Returns
/// The level that was set
pub fn apply_logging_config(config: &LoggingConfig) -> Level {
    let level = config.level.parse::<Level>().unwrap_or(Level::Warn);
    if level == Level::Debug {
        enable_debug();
    }
    if config.verbose {
        enable_verbose();
    }
    set_level(level);

    if !config.file.is_empty() {
        let path = Path::new(&config.file);
        if init_file_logging(path) {
            logger::info!("File logging initialized at: {}", path.display());
        } else {
            eprintln!("✗ Failed to initialize file logging at: {}", path.display());
        }
    }
    level
}
