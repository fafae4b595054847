use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug, Clone)]
pub enum DiagnosticsError {
    #[error("Invalid diagnostics filter '{filter}': {details}")]
    InvalidFilter { filter: String, details: String },
    #[error("Diagnostics subscriber could not be installed: {0}")]
    InstallFailed(String),
}

static INSTALLED: OnceLock<Result<(), DiagnosticsError>> = OnceLock::new();

/// Installs the `tracing` subscriber for the crate's own diagnostics.
///
/// `RUST_LOG` wins over `default_filter`. Only the first call installs;
/// later calls return the first outcome.
pub fn setup_diagnostics(default_filter: &str) -> Result<(), DiagnosticsError> {
    INSTALLED
        .get_or_init(|| install(default_filter))
        .clone()
}

fn install(default_filter: &str) -> Result<(), DiagnosticsError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| DiagnosticsError::InvalidFilter {
            filter: default_filter.to_string(),
            details: e.to_string(),
        })?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| DiagnosticsError::InstallFailed(e.to_string()))
}
