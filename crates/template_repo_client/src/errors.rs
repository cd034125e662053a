//! Error types for template repository client operations.
//!
//! Every fallible operation in this crate returns [`Result`]. Transport and
//! decoding failures are wrapped so that test code can propagate them with `?`
//! and still see the underlying cause.

use std::time::Duration;

use reqwest::StatusCode;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the template API.
///
/// ## Examples
///
/// ```rust,ignore
/// use template_repo_client::Error;
///
/// match client.get_number_of_templates(&[]).await {
///     Ok(count) => println!("{count} templates"),
///     Err(Error::UnexpectedStatus { status, .. }) => eprintln!("server said {status}"),
///     Err(err) => eprintln!("other error: {err}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration value.
    ///
    /// Raised while building a [`crate::ClientConfig`], e.g. when a base URL
    /// cannot be parsed or a timeout budget is not a number.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A response body could not be decoded into the expected shape.
    #[error("Failed to deserialize response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A lifecycle hook did not finish within its timeout budget.
    #[error("Hook '{hook}' exceeded its timeout budget of {budget:?}")]
    HookTimedOut {
        /// Name of the hook that timed out.
        hook: String,
        /// Budget the hook was given.
        budget: Duration,
    },

    /// The remote template index did not answer with 200 OK.
    #[error("Fetching template index from {url} returned status {status}")]
    IndexFetch {
        /// Index URL that was requested.
        url: String,
        /// Status code returned by the index host.
        status: StatusCode,
    },

    /// A test case panicked, usually on a failed assertion.
    #[error("Test case panicked: {message}")]
    TestPanicked {
        /// Panic payload, or a placeholder when it was not a string.
        message: String,
    },

    /// Network or protocol failure reported by the HTTP client.
    #[error("HTTP transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status code the operation cannot interpret.
    #[error("{operation} - Unknown status code received: {status}")]
    UnexpectedStatus {
        /// Operation that received the response.
        operation: &'static str,
        /// Status code returned by the server.
        status: StatusCode,
    },
}
