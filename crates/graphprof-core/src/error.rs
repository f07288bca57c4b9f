use thiserror::Error;

/// Errors that can occur in graphprof-core.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Unknown configuration preset name.
    #[error("unknown preset: {0} (expected one of: minimal, default, complete)")]
    UnknownPreset(String),
    /// Unknown configuration option key.
    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),
    /// Parallelism must be at least 1.
    #[error("invalid parallelism: {0} (must be >= 1)")]
    InvalidParallelism(usize),
    /// A measure algorithm failed to construct or run.
    #[error("measure computation failed for {key}: {reason}")]
    MeasureComputation { key: String, reason: String },
    /// A post-processing job (statistics, correlation, plot) failed.
    #[error("post-processing failed: {0}")]
    PostProcessing(String),
    /// Unknown report output type.
    #[error("unknown output type: {given} (options are: {supported})")]
    UnsupportedOutput { given: String, supported: String },
    /// Interactive display requested without a display sink.
    #[error("missing dependency: {0}")]
    MissingDependency(String),
    /// Interactive display requested outside a supporting environment.
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),
    /// Queried measure was never enabled or was dropped during computation.
    #[error("measure not found: {0}")]
    MeasureNotFound(String),
    /// A graph file could not be parsed.
    #[error("graph parse error in {path}: {reason}")]
    GraphParse { path: String, reason: String },
}

/// Result type alias for graphprof-core.
pub type Result<T> = std::result::Result<T, Error>;
