//! Classified failures.
//!
//! # Responsibilities
//! - Tag every failure with a retry-relevant category
//! - Keep the original cause chain intact for callers and logs
//! - Provide the `raise` helpers used by local logic and boundary adapters
//!
//! # Design Decisions
//! - Category is fixed at construction; there is no setter
//! - External error types map into the category enum via [`Classify`];
//!   anything a boundary cannot map is `Other`

use std::fmt;

use thiserror::Error;

/// Boxed cause carried by a [`ClassifiedFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Retry-relevant failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// Target is overloaded or contended.
    Busy,
    /// Target could not be reached.
    Unavailable,
    /// Operation was interrupted before completing.
    Interrupted,
    /// A referenced resource or setup routine does not exist.
    NotFound,
    /// Anything else.
    Other,
}

impl FailureCategory {
    /// Whether the category is transient under the default policy.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            FailureCategory::Busy | FailureCategory::Unavailable | FailureCategory::Interrupted
        )
    }

    /// Stable lowercase label, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::Busy => "busy",
            FailureCategory::Unavailable => "unavailable",
            FailureCategory::Interrupted => "interrupted",
            FailureCategory::NotFound => "not-found",
            FailureCategory::Other => "other",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tagged with a [`FailureCategory`].
#[derive(Debug, Error)]
#[error("{category}: {message}")]
pub struct ClassifiedFailure {
    category: FailureCategory,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ClassifiedFailure {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying error.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn is_transient(&self) -> bool {
        self.category.is_transient()
    }
}

/// Maps a foreign error type onto a [`FailureCategory`].
pub trait Classify {
    fn category(&self) -> FailureCategory;
}

/// Build a failure as an `Err` so call sites can `return raise(..)`.
pub fn raise<T>(category: FailureCategory, message: impl Into<String>) -> Result<T, ClassifiedFailure> {
    Err(ClassifiedFailure::new(category, message))
}

/// Like [`raise`], keeping `cause` as the failure's source.
pub fn raise_with<T>(
    category: FailureCategory,
    message: impl Into<String>,
    cause: impl Into<BoxError>,
) -> Result<T, ClassifiedFailure> {
    Err(ClassifiedFailure::new(category, message).with_cause(cause))
}

/// Adapt a classifiable error at a boundary. The error itself becomes the cause.
pub fn classify<E>(err: E) -> ClassifiedFailure
where
    E: Classify + std::error::Error + Send + Sync + 'static,
{
    ClassifiedFailure::new(err.category(), err.to_string()).with_cause(err)
}
