//! Error taxonomy shared by every layer of the core.
//!
//! Variants carry plain data (status codes, ids, cause strings). The
//! `Display` text is what screens show to the user.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used across the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length of a cause string kept inside an error.
const MAX_CAUSE_LENGTH: usize = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Error creating request")]
    RequestConstructionFailed,

    #[error("Session token is missing. Please log in again")]
    SessionTokenMissing,

    #[error("Received error from server: {0}")]
    ServerTransport(String),

    #[error("Received error from api status code {0}")]
    ApiStatus(u16),

    #[error("Authentication failed. Please check your credentials")]
    AuthenticationFailed,

    #[error("No data received from server")]
    NoDataReceived,

    #[error("There was an error parsing data")]
    DataParsingFailed,

    #[error("Persistent store error: {0}")]
    PersistentStore(String),

    #[error("Hero with id {0} not found")]
    HeroNotFound(String),
}

impl Error {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => Error::AuthenticationFailed,
            code => Error::ApiStatus(code),
        }
    }

    /// Wrap a transport failure (no response received).
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Error::ServerTransport(truncate_cause(&err.to_string()))
    }

    /// Wrap a persistence failure.
    pub fn store(err: impl std::fmt::Display) -> Self {
        Error::PersistentStore(truncate_cause(&err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::store(err)
    }
}

fn truncate_cause(cause: &str) -> String {
    if cause.len() <= MAX_CAUSE_LENGTH {
        return cause.to_string();
    }
    let mut end = MAX_CAUSE_LENGTH;
    while !cause.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &cause[..end], cause.len())
}
