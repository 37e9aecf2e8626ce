//! Quote source trait
//!
//! Defines the remote capability the daily quote cache reads through.

use std::future::Future;

use thiserror::Error;

use super::Quote;

/// Errors that can occur when fetching quotes from a remote source
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The backend has no quotes to choose from
    #[error("No quotes available in database")]
    Empty,

    /// A lookup by id matched nothing
    #[error("Quote not found: {0}")]
    NotFound(String),

    /// A page number too large to turn into a row offset
    #[error("Page {page} with {page_size} quotes per page is out of range")]
    PageOutOfRange { page: usize, page_size: usize },

    /// The source could not be reached for some other reason
    #[error("Quote source unavailable: {0}")]
    Unavailable(String),
}

/// A remote provider of the quote of the day
///
/// Which quote is "the" quote for a given day is decided by the
/// implementation, not by callers.
pub trait QuoteSource: Send + Sync {
    /// Fetches the quote designated for the current day
    fn fetch_quote_of_the_day(&self) -> impl Future<Output = Result<Quote, SourceError>> + Send;
}
