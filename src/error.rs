use thiserror::Error;

/// Fatal simulation errors. Nothing is retried or recovered mid-run:
/// either the whole script loads and runs, or the error propagates up
/// to the driver and the process exits non-zero.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Malformed metadata instruction syntax. Aborts the load before any
    /// simulation log output is produced.
    #[error("cannot parse metadata - {0}")]
    Parse(String),

    /// Missing or invalid configuration settings.
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimulationError {
    pub fn parse(msg: impl Into<String>) -> SimulationError {
        SimulationError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> SimulationError {
        SimulationError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
