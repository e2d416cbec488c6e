//! Checkout Errors

use salvo::http::StatusError;
use tracing::error;

use presswork::checkout::CheckoutError;
use presswork_app::domain::checkout::CheckoutServiceError;

pub(crate) fn into_status_error(error: CheckoutServiceError) -> StatusError {
    match error {
        CheckoutServiceError::UnknownCurrency(code) => {
            StatusError::bad_request().brief(format!("Unknown currency {code:?}"))
        }
        CheckoutServiceError::InvalidAddress => {
            StatusError::bad_request().brief("Destination country and postal code are required")
        }
        CheckoutServiceError::Plan(CheckoutError::DuplicateReference(reference)) => {
            StatusError::bad_request().brief(format!("Duplicate line reference {reference}"))
        }
        CheckoutServiceError::Plan(CheckoutError::NegativeShipping) => {
            StatusError::bad_request().brief("Shipping must not be negative")
        }
        CheckoutServiceError::Plan(CheckoutError::AmountOverflow) => {
            StatusError::bad_request().brief("Order amounts are too large")
        }
        CheckoutServiceError::Plan(CheckoutError::Discount(source)) => {
            StatusError::bad_request().brief(format!("Invalid discount: {source}"))
        }
        CheckoutServiceError::TaxService(source) => {
            error!("tax calculation failed: {source}");

            StatusError::bad_gateway().brief("Tax calculation unavailable")
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use presswork_app::domain::tax::TaxServiceError;

    use super::*;

    #[test]
    fn validation_failures_are_bad_requests() {
        for error in [
            CheckoutServiceError::UnknownCurrency("zzz".to_string()),
            CheckoutServiceError::InvalidAddress,
            CheckoutServiceError::Plan(CheckoutError::NegativeShipping),
            CheckoutServiceError::Plan(CheckoutError::DuplicateReference("A".into())),
            CheckoutServiceError::Plan(CheckoutError::AmountOverflow),
        ] {
            assert_eq!(into_status_error(error).code, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn tax_service_failure_is_bad_gateway() {
        let error = CheckoutServiceError::TaxService(TaxServiceError::MissingCalculationId);

        assert_eq!(into_status_error(error).code, StatusCode::BAD_GATEWAY);
    }
}
