//! Error types and context management for extraction and generation

use crate::spatial::grid::Position;
use std::fmt;
use std::path::PathBuf;

/// Main error type for all algorithm operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// The sample contains no tile at all
    ExtractionEmptyInput,

    /// Generation was requested with a rule set that has no symbols or kernels
    RuleSetExhausted,

    /// Cells ran out of candidates and the failure policy does not retry
    Contradiction {
        /// Positions in contradiction when the run stopped
        positions: Vec<Position>,
    },

    /// A region kept failing after its retry budget was spent
    GenerationFailed {
        /// Attempts made on the failing region, including the first
        attempts: usize,
        /// Positions still not collapsed when the run stopped
        unresolved: Vec<Position>,
    },

    /// Source data doesn't meet algorithm requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Algorithm parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to load a sample slice from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a generated slice to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// Rule file could not be encoded or decoded
    Serialization {
        /// Path of the rule file
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtractionEmptyInput => {
                write!(f, "Sample contains no tiles; nothing to extract")
            }
            Self::RuleSetExhausted => {
                write!(f, "Rule set contains no symbols to generate with")
            }
            Self::Contradiction { positions } => {
                write!(f, "Contradiction at {} cell(s)", positions.len())?;
                if let Some(first) = positions.first() {
                    write!(f, ", first at {first:?}")?;
                }
                Ok(())
            }
            Self::GenerationFailed {
                attempts,
                unresolved,
            } => {
                write!(
                    f,
                    "Generation failed after {attempts} attempt(s) with {} unresolved cell(s)",
                    unresolved.len()
                )
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { path, source } => {
                write!(f, "Failed to encode rules '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for algorithm results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

/// Attaches the path and operation to errors raised while touching the filesystem
pub trait WithContext<T> {
    /// Replace the placeholder path of an I/O, image or JSON error
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Name the file system operation that failed
    ///
    /// # Errors
    ///
    /// Propagates the original error with the operation applied
    fn with_operation(self, operation: &'static str) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<AlgorithmError>,
{
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                AlgorithmError::ImageLoad { path: slot, .. }
                | AlgorithmError::ImageExport { path: slot, .. }
                | AlgorithmError::Serialization { path: slot, .. }
                | AlgorithmError::FileSystem { path: slot, .. } => *slot = path.into(),
                _ => {}
            }
            error
        })
    }

    fn with_operation(self, operation: &'static str) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only file system errors carry an operation name
            if let AlgorithmError::FileSystem { operation: slot, .. } = &mut error {
                *slot = operation;
            }
            error
        })
    }
}

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for AlgorithmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid source data error
pub fn invalid_source(reason: &impl ToString) -> AlgorithmError {
    AlgorithmError::InvalidSourceData {
        reason: reason.to_string(),
    }
}
