//! Error types for the tuner analysis core.

/// Errors that can occur while configuring or running the analysis pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TunerError {
    /// Input/output buffer size doesn't match the configured FFT size.
    BufferSizeMismatch,
    /// FFT size is not a power of two.
    UnsupportedFftSize,
    /// Configuration parameters are invalid (non-positive rate, hop >= N, ...).
    InvalidConfiguration,
    /// A temperament index falls outside the registry's bounds.
    TemperamentIndexOutOfRange,
    /// Attempted to add/update/remove a built-in temperament.
    BuiltinTemperamentImmutable,
    /// A custom temperament failed validation (wrong ratio count, non-positive ratio, ...).
    InvalidTemperament(String),
    /// The WAV container could not be parsed (bad magic, unsupported format code, ...).
    WavFormatError(String),
    /// Reading the WAV file failed at the I/O layer.
    WavIoError(String),
}

impl std::fmt::Display for TunerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunerError::BufferSizeMismatch => write!(f, "input/output buffer size mismatch"),
            TunerError::UnsupportedFftSize => write!(f, "FFT size must be a power of two"),
            TunerError::InvalidConfiguration => write!(f, "invalid analysis configuration"),
            TunerError::TemperamentIndexOutOfRange => {
                write!(f, "temperament index out of range")
            }
            TunerError::BuiltinTemperamentImmutable => {
                write!(f, "built-in temperaments cannot be modified or removed")
            }
            TunerError::InvalidTemperament(reason) => {
                write!(f, "invalid custom temperament: {reason}")
            }
            TunerError::WavFormatError(reason) => write!(f, "unsupported WAV file: {reason}"),
            TunerError::WavIoError(reason) => write!(f, "failed to read WAV file: {reason}"),
        }
    }
}

impl std::error::Error for TunerError {}

impl From<std::io::Error> for TunerError {
    fn from(err: std::io::Error) -> Self {
        TunerError::WavIoError(err.to_string())
    }
}

impl From<hound::Error> for TunerError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io_err) => TunerError::WavIoError(io_err.to_string()),
            other => TunerError::WavFormatError(other.to_string()),
        }
    }
}
