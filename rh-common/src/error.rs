use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no persisted stream state found and no bootstrap configured")]
    StateUnavailable,

    #[error("position unresolvable: {0}")]
    PositionUnresolvable(String),

    #[error("recovery divergence unresolved: {0}")]
    RecoveryDivergenceUnresolved(String),

    #[error("dependency failure: {0}")]
    DependencyFailure(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("serde json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether a supervisor may retry the restart as is. Divergence and
    /// position errors need a fresh dump or a resync first.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DependencyFailure(_) | Self::IoError(_) | Self::SqlxError(_) => true,
            Self::StateUnavailable
            | Self::PositionUnresolvable(_)
            | Self::RecoveryDivergenceUnresolved(_)
            | Self::ConfigError(_)
            | Self::SerdeJsonError(_) => false,
        }
    }
}
