//! Resolution of file config plus CLI flag overrides.
//!
//! Core never sees these flags; it receives a built `SessionConfig` and a
//! parsed endpoint.

use std::path::PathBuf;
use std::time::Duration;

use sfa_config::Config;
use sfa_core::{SessionConfig, SocketEndpoint};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `SFA_CONFIG`, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(sfa_config::config_path)
}

/// Load the file config with environment overrides applied.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(sfa_config::load_config_from(&config_path(global))?)
}

/// Apply flag overrides that map onto file settings.
pub fn apply_overrides(global: &GlobalOpts, cfg: &mut Config) {
    if let Some(endpoint) = &global.endpoint {
        cfg.endpoint.clone_from(endpoint);
    }
}

/// Build the engine endpoint from the resolved config.
pub fn endpoint(cfg: &Config) -> Result<SocketEndpoint, CliError> {
    Ok(SocketEndpoint::new(cfg.endpoint_addr()?))
}

/// Session config, with an optional status interval override.
pub fn session(cfg: &Config, interval: Option<Duration>) -> Result<SessionConfig, CliError> {
    let mut session = cfg.session_config()?;
    if let Some(interval) = interval {
        session.status_interval = interval;
        session.validate()?;
    }
    Ok(session)
}
