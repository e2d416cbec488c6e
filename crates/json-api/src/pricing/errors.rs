//! Pricing Errors

use salvo::http::StatusError;
use tracing::error;

use presswork_app::domain::pricing::PricingServiceError;

pub(crate) fn into_status_error(error: PricingServiceError) -> StatusError {
    match error {
        PricingServiceError::NoOptions => {
            StatusError::bad_request().brief("At least one option id is required")
        }
        PricingServiceError::Sql(source) => {
            error!("failed to look up variant price: {source}");

            StatusError::internal_server_error()
        }
        PricingServiceError::Vendor(source) => {
            error!("live vendor pricing failed: {source}");

            StatusError::bad_gateway().brief("Live vendor pricing unavailable")
        }
    }
}
