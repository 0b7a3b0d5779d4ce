//! Error types for the pool family.

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by pools and result handles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A worker or scheduler thread could not be spawned
    #[error("thread spawn failed: {0}")]
    Spawn(#[from] std::io::Error),

    /// Submission arrived after shutdown began
    #[error("pool is shutting down")]
    ShuttingDown,

    /// The job panicked while running; the payload message is captured
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The pool was torn down before the job could run
    #[error("task abandoned before it could run")]
    Abandoned,
}

impl Error {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}
