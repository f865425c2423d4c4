//! Error types for unlayout library.

use thiserror::Error;

/// Result type alias for unlayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while turning layout regions into a document.
#[derive(Error, Debug)]
pub enum Error {
    /// A format flag or threshold set is invalid. Fatal for the document.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A page could not be processed (unreadable raster, invalid regions).
    #[error("Page {index} failed: {source}")]
    Page {
        /// 0-based page index
        index: usize,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// A region violates a catalog invariant.
    #[error("Invalid region {region_id} on page {page_index}: {reason}")]
    InvalidRegion {
        /// Page the region belongs to
        page_index: usize,
        /// Region identifier
        region_id: u32,
        /// What is wrong with it
        reason: String,
    },

    /// A page has non-finite or non-positive dimensions.
    #[error("Invalid page {page_index}: size {width}x{height}")]
    InvalidPage {
        /// 0-based page index
        page_index: usize,
        /// Page width in layout units
        width: f32,
        /// Page height in layout units
        height: f32,
    },

    /// A write-once region slot was written twice.
    #[error("Region {region_id}: {field} is already set")]
    AlreadyWritten {
        /// Region identifier
        region_id: u32,
        /// Name of the slot ("extraction" or "order_index")
        field: &'static str,
    },

    /// The page raster cannot be decoded into pixels.
    #[error("Unreadable page image: {0}")]
    UnreadableImage(String),

    /// Processing was cancelled by the caller.
    #[error("Processing cancelled")]
    Cancelled,

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Tag an error with the page it occurred on.
    pub fn on_page(self, index: usize) -> Self {
        match self {
            Error::Page { .. } => self,
            other => Error::Page {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Page index if this is a page-level failure.
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Error::Page { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::WorkerPool(err.to_string())
    }
}

/// Error raised by a content extraction provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Retryable failure (timeout, resource busy, rate limited).
    #[error("Transient extraction error: {0}")]
    Transient(String),

    /// Non-retryable failure for the path that raised it.
    #[error("Permanent extraction error: {0}")]
    Permanent(String),
}

impl ExtractionError {
    /// Create a transient error.
    pub fn transient(msg: impl Into<String>) -> Self {
        ExtractionError::Transient(msg.into())
    }

    /// Create a permanent error.
    pub fn permanent(msg: impl Into<String>) -> Self {
        ExtractionError::Permanent(msg.into())
    }

    /// Whether another attempt on the same path may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractionError::Transient(_))
    }
}

/// Error raised by a learned reading-order provider. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Reading order error: {0}")]
pub struct OrderingError(pub String);

impl OrderingError {
    /// Create an ordering error.
    pub fn new(msg: impl Into<String>) -> Self {
        OrderingError(msg.into())
    }
}
