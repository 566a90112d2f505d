use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the session can recover from.
///
/// None of these terminate the application: the UI renders them into the
/// status line and keeps the current session state.
#[derive(Error, Debug)]
pub enum DrillError {
    /// Malformed station label or numeric field.
    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Too few samples for the requested smoothing window.
    #[error("{available} samples are not enough for a window of {window}")]
    InsufficientData { available: usize, window: usize },

    /// Missing or invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The file name does not identify a left, center or right channel.
    #[error("cannot determine channel (L/M/R) from file name '{0}'")]
    UnrecognizedChannel(String),

    /// A required column could not be found in the header.
    #[error("'{file}' has no {column} column")]
    MissingColumn { file: String, column: &'static str },

    /// The file could not be decoded with any supported encoding.
    #[error("'{file}' is neither valid UTF-8 nor {encoding}")]
    Encoding { file: String, encoding: &'static str },

    /// The point-cloud backend is not usable in this environment.
    #[error("point-cloud export is unavailable: {0}")]
    UnsupportedExport(String),

    /// The export itself was rejected (e.g. nothing to write).
    #[error("export failed: {0}")]
    Export(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Parquet error in '{path}': {source}")]
    Parquet {
        path: String,
        #[source]
        source: parquet::errors::ParquetError,
    },
}

impl DrillError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        DrillError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        DrillError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type used by the processing modules.
pub type Result<T> = std::result::Result<T, DrillError>;
