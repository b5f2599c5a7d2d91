//! Tracing initialisation shared by tunematch binaries
//!
//! The subscriber is installed before the bootstrap config is read, so
//! config loading itself is logged. The configured level is applied
//! afterwards through a reload handle.

use crate::{Error, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Level used until the config file has been read
pub const STARTUP_LOG_LEVEL: &str = "info";

/// Handle for changing the global filter after startup
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LogLevelHandle {
    /// Switch to the configured level
    ///
    /// No-op when `RUST_LOG` was set at startup.
    pub fn apply_level(&self, level: &str) -> Result<()> {
        if self.env_override {
            tracing::debug!(level, "RUST_LOG is set, ignoring configured log level");
            return Ok(());
        }

        let filter = parse_level(level)?;
        self.handle
            .reload(filter)
            .map_err(|e| Error::Internal(format!("Failed to apply log level: {}", e)))
    }
}

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence over both the startup level and the level
/// applied later from the config file.
pub fn init_tracing() -> Result<LogLevelHandle> {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let env_override = env_filter.is_some();
    let filter = match env_filter {
        Some(filter) => filter,
        None => parse_level(STARTUP_LOG_LEVEL)?,
    };

    let (filter_layer, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(LogLevelHandle {
        handle,
        env_override,
    })
}

/// Parse a level or filter directive string (`info`, `tunematch_web=debug`)
pub fn parse_level(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", level, e)))
}
