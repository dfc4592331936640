//! Logging bootstrap

use crate::settings::{LoggingSettings, SettingsError};

/// Install the global `tracing` subscriber.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// stays in place.
pub fn init_logging(settings: &LoggingSettings) -> Result<bool, SettingsError> {
    let level = settings.level_filter()?;
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(%level, "logging initialised");
    }
    Ok(installed)
}
