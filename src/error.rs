//! Error types for the public API.
//!
//! Internally the crate works with `anyhow` (see `Res`). At the public boundary errors are
//! tagged with an `ErrorType` so that callers can tell bad input apart from a store failure
//! without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of an `Error`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The user supplied input that cannot become a transaction. Never reaches the store.
    Validation,
    /// There is no user in the session.
    Session,
    /// The ledger store failed to answer a query or apply a mutation.
    Store,
    /// A cache patch did not correspond to the window it targeted.
    StaleWindow,
    /// The configuration or home directory is missing or malformed.
    Config,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error with an `ErrorType` attached.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: anyhow::Error) -> Self {
        Self { error_type, inner }
    }

    /// Create an error from a message.
    pub(crate) fn msg(error_type: ErrorType, message: impl Display) -> Self {
        Self::new(error_type, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// The outermost message, without the chain of causes.
    pub fn message(&self) -> String {
        self.inner.to_string()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<anyhow::Error> for Error {
    fn from(inner: anyhow::Error) -> Self {
        Self::new(ErrorType::Internal, inner)
    }
}

/// Converts an internal `Res` into a public `Result` with the given `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
