//! Error types for the lacquer library

use thiserror::Error;

/// Result type alias for lacquer operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building a pipeline from invalid settings.
///
/// Steady-state frame processing never returns errors: inconsistent per-frame
/// input degrades to a logged reset or pass-through instead, so a bad frame
/// can never take the effect offline. Everything that can actually fail is
/// checked once, up front, here.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Morphological structuring elements need a center pixel
    #[error("morphology kernel size must be odd and non-zero, got {0}")]
    InvalidKernelSize(usize),

    /// The temporal blend needs at least the current frame
    #[error("mask history depth must be at least 1, got {0}")]
    InvalidHistoryDepth(usize),

    /// Smoothing factor outside (0, 1] either freezes or overshoots the blend
    #[error("smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),
}
