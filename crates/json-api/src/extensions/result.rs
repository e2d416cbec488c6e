//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::debug;

/// Map errors onto logged HTTP status errors.
pub(crate) trait ResultExt<T> {
    /// Reject the request body as a bad request, echoing the error as the brief.
    fn or_400(self, context: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_400(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            debug!("{context}: {error}");

            StatusError::bad_request().brief(format!("{context}: {error}"))
        })
    }
}
