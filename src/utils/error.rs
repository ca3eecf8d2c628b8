use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Output directory does not exist: {}", path.display())]
    OutputDirMissing { path: PathBuf },

    #[error("Failed to render chart {}: {message}", path.display())]
    RenderError { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Data error: {message}")]
    DataError { message: String },

    #[error("Benchmark output parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Render task failed: {message}")]
    TaskError { message: String },

    #[error("{failed} of {total} charts failed to render")]
    PartialFailure { failed: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Filesystem,
    Rendering,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GraphError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GraphError::IoError(_) | GraphError::OutputDirMissing { .. } => {
                ErrorCategory::Filesystem
            }
            GraphError::RenderError { .. } | GraphError::PartialFailure { .. } => {
                ErrorCategory::Rendering
            }
            GraphError::SerializationError(_)
            | GraphError::DataError { .. }
            | GraphError::ParseError { .. } => ErrorCategory::Data,
            GraphError::ConfigError { .. }
            | GraphError::ConfigValidationError { .. }
            | GraphError::InvalidConfigValueError { .. }
            | GraphError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GraphError::TaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GraphError::PartialFailure { .. } => ErrorSeverity::Medium,
            GraphError::TaskError { .. } => ErrorSeverity::Critical,
            GraphError::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GraphError::IoError(_) => {
                "Check that the output directory is writable and the disk is not full".to_string()
            }
            GraphError::OutputDirMissing { path } => {
                format!("Create the directory '{}' before rendering", path.display())
            }
            GraphError::RenderError { .. } => {
                "Make sure a system font is installed and the file extension is png or svg"
                    .to_string()
            }
            GraphError::SerializationError(_) | GraphError::DataError { .. } => {
                "Check the benchmark data file against the expected JSON layout".to_string()
            }
            GraphError::ParseError { .. } => {
                "Run the benchmarks with 'go test -bench . -benchmem' and pass the raw output"
                    .to_string()
            }
            GraphError::ConfigError { .. }
            | GraphError::ConfigValidationError { .. }
            | GraphError::InvalidConfigValueError { .. }
            | GraphError::MissingConfigError { .. } => {
                "Fix the configuration file or the command line flags".to_string()
            }
            GraphError::TaskError { .. } => "Re-run with --jobs 1 and --verbose".to_string(),
            GraphError::PartialFailure { .. } => {
                "Inspect the log for the charts that failed and re-run".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GraphError::OutputDirMissing { path } => {
                format!("Output directory '{}' was not found", path.display())
            }
            GraphError::RenderError { path, .. } => {
                format!("Chart '{}' could not be rendered", path.display())
            }
            GraphError::ParseError { line, .. } => {
                format!("Benchmark output could not be read (line {})", line)
            }
            GraphError::PartialFailure { failed, total } => {
                format!("{} of {} charts were not generated", failed, total)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
