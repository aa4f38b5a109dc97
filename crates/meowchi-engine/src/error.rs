//! Error types for the Meowchi engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run itself,
//! so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: meowchi_core::ConfigError,
    },

    /// The runner failed to shut down cleanly.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: meowchi_core::RunnerError,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal handler error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
