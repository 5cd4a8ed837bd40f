//! Export error taxonomy.

use barprint_core::CoreError;

/// Errors that can occur while exporting a symbol.
///
/// Argument errors are raised before any byte is written.  Any other
/// error may leave partial output behind; the caller owns the
/// destination and must discard it.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A caller contract violation: bad size, resolution, or symbol.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No document backend is registered under the requested name.
    #[error("document backend {0:?} is not available")]
    BackendUnavailable(String),

    /// The backend exists but is incompatible or failed internally.
    #[error("document backend {name:?} failed: {reason}")]
    BackendAccess {
        /// Registered backend name.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// Writing to the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JPEG, BMP, or TIFF encoding failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

impl From<CoreError> for ExportError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidArgument(msg) => Self::InvalidArgument(msg),
        }
    }
}
