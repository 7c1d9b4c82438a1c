//! Error types for the CWT module

/// CWT error type
#[derive(Debug, thiserror::Error)]
pub enum CwtError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported wavelet '{name}'; use one of: morlet, bump, cmhat, hhhat")]
    UnsupportedWavelet { name: String },

    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}

impl CwtError {
    /// Shorthand for `CwtError::InvalidArgument`
    pub fn invalid(msg: impl Into<String>) -> Self {
        CwtError::InvalidArgument(msg.into())
    }

    /// True for every error raised by argument validation (bad `dt`,
    /// malformed wavelet parameters, unsupported wavelet name, ...).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CwtError::InvalidArgument(_) | CwtError::UnsupportedWavelet { .. }
        )
    }
}

pub type CwtResult<T> = Result<T, CwtError>;
