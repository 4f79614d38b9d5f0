use thiserror::Error;

use tally_config::ConfigError;
use tally_core::CoreError;

/// Failures surfaced by the [`crate::Tally`] facade.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
