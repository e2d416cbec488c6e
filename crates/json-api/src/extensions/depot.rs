//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Helpers for typed depot access.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_request_id(&mut self, request_id: String);

    /// Request id set by the logging middleware, if it ran.
    fn request_id(&self) -> &str;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_request_id(&mut self, request_id: String) {
        self.insert(REQUEST_ID_DEPOT_KEY, request_id);
    }

    fn request_id(&self) -> &str {
        self.get::<String>(REQUEST_ID_DEPOT_KEY)
            .map_or("", String::as_str)
    }
}
