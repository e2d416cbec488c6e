//! Checkout Requests

use decimal_percentage::Percentage;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use presswork::{
    discounts::Discount,
    lines::{CartLine, LineError, LinePrice},
    tax::TaxAddress,
};
use presswork_app::domain::checkout::models::{CheckoutRequest, Settlement};

/// Reasons a checkout payload is rejected before reaching the service.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CheckoutRequestError {
    #[error(transparent)]
    Line(#[from] LineError),

    #[error("store credit must not be negative")]
    NegativeStoreCredit,

    #[error("percentage off must be between 0 and 100")]
    PercentageOutOfRange,
}

/// Destination address used to locate the tax jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct AddressRequest {
    /// Two-letter country code
    pub country: String,

    /// Postal or ZIP code
    pub postal_code: String,

    pub state: Option<String>,
    pub city: Option<String>,
    pub line1: Option<String>,
}

impl From<AddressRequest> for TaxAddress {
    fn from(request: AddressRequest) -> Self {
        TaxAddress {
            country: request.country,
            postal_code: request.postal_code,
            state: request.state,
            city: request.city,
            line1: request.line1,
        }
    }
}

/// Line pricing, either a whole-line total or a unit price times quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum LinePriceRequest {
    LineTotal { amount: i64 },
    UnitPrice { unit_amount: i64, quantity: u32 },
}

impl From<LinePriceRequest> for LinePrice {
    fn from(request: LinePriceRequest) -> Self {
        match request {
            LinePriceRequest::LineTotal { amount } => LinePrice::LineTotal { amount },
            LinePriceRequest::UnitPrice {
                unit_amount,
                quantity,
            } => LinePrice::UnitPrice {
                unit_amount,
                quantity,
            },
        }
    }
}

/// Checkout Line Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct CheckoutLineRequest {
    /// Caller-stable line reference, unique within the cart
    pub reference: String,

    pub price: LinePriceRequest,

    /// Product tax classification code
    pub tax_code: Option<String>,
}

impl TryFrom<CheckoutLineRequest> for CartLine {
    type Error = CheckoutRequestError;

    fn try_from(request: CheckoutLineRequest) -> Result<Self, Self::Error> {
        let line = CartLine::priced(request.reference, request.price.into())?;

        Ok(match request.tax_code {
            Some(tax_code) => line.with_tax_code(tax_code),
            None => line,
        })
    }
}

/// Discount Request
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum DiscountRequest {
    #[default]
    None,
    StoreCredit {
        amount: i64,
    },
    PercentageOff {
        percentage: i32,
    },
}

impl TryFrom<DiscountRequest> for Discount {
    type Error = CheckoutRequestError;

    fn try_from(request: DiscountRequest) -> Result<Self, Self::Error> {
        match request {
            DiscountRequest::None => Ok(Discount::None),
            DiscountRequest::StoreCredit { amount } if amount < 0 => {
                Err(CheckoutRequestError::NegativeStoreCredit)
            }
            DiscountRequest::StoreCredit { amount } => Ok(Discount::StoreCredit(amount)),
            DiscountRequest::PercentageOff { percentage } if !(0..=100).contains(&percentage) => {
                Err(CheckoutRequestError::PercentageOutOfRange)
            }
            DiscountRequest::PercentageOff { percentage } => Ok(Discount::PercentageOff(
                Percentage::from(f64::from(percentage) / 100.0),
            )),
        }
    }
}

/// Checkout Quote Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct QuoteRequest {
    /// ISO 4217 currency code
    pub currency: String,

    pub address: AddressRequest,

    /// Cart lines in display order
    pub lines: Vec<CheckoutLineRequest>,

    #[serde(default)]
    pub discount: DiscountRequest,

    /// Shipping cost in minor units
    #[serde(default)]
    pub shipping: i64,
}

impl TryFrom<QuoteRequest> for CheckoutRequest {
    type Error = CheckoutRequestError;

    fn try_from(request: QuoteRequest) -> Result<Self, Self::Error> {
        let lines = request
            .lines
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CheckoutRequest {
            currency: request.currency,
            address: request.address.into(),
            lines,
            discount: request.discount.try_into()?,
            shipping: request.shipping,
        })
    }
}

/// Reconcile Request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct ReconcileRequest {
    /// Total the payment processor settled, in minor units
    pub settled_total: Option<i64>,

    /// Post-discount subtotal of the taxable lines
    pub net_subtotal: i64,

    #[serde(default)]
    pub shipping: i64,
}

impl From<ReconcileRequest> for Settlement {
    fn from(request: ReconcileRequest) -> Self {
        Settlement {
            settled_total: request.settled_total,
            net_subtotal: request.net_subtotal,
            shipping: request.shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use presswork::lines::LineReference;

    use super::*;

    #[test]
    fn quote_request_converts_unit_priced_lines() -> TestResult {
        let request: QuoteRequest = serde_json::from_value(json!({
            "currency": "usd",
            "address": { "country": "US", "postal_code": "94107" },
            "lines": [
                { "reference": "A", "price": { "type": "unit_price", "unit_amount": 250, "quantity": 4 }, "tax_code": "txcd_99999999" },
                { "reference": "B", "price": { "type": "line_total", "amount": 2000 } }
            ],
            "discount": { "type": "store_credit", "amount": 300 }
        }))?;

        let checkout = CheckoutRequest::try_from(request)?;

        assert_eq!(checkout.lines.len(), 2);
        assert_eq!(
            checkout.lines.first().map(CartLine::amount),
            Some(1_000)
        );
        assert_eq!(
            checkout.lines.first().and_then(CartLine::tax_code),
            Some("txcd_99999999")
        );
        assert_eq!(checkout.shipping, 0);
        assert!(
            matches!(checkout.discount, Discount::StoreCredit(300)),
            "expected store credit, got {:?}",
            checkout.discount
        );

        Ok(())
    }

    #[test]
    fn discount_defaults_to_none() -> TestResult {
        let request: QuoteRequest = serde_json::from_value(json!({
            "currency": "cad",
            "address": { "country": "CA", "postal_code": "M5V 2T6" },
            "lines": [],
            "shipping": 995
        }))?;

        assert_eq!(request.discount, DiscountRequest::None);
        assert_eq!(request.shipping, 995);

        Ok(())
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let line = CheckoutLineRequest {
            reference: "A".to_string(),
            price: LinePriceRequest::UnitPrice {
                unit_amount: 100,
                quantity: 0,
            },
            tax_code: None,
        };

        assert_eq!(
            CartLine::try_from(line),
            Err(CheckoutRequestError::Line(LineError::ZeroQuantity(
                LineReference::from("A")
            )))
        );
    }

    #[test]
    fn out_of_range_discounts_are_rejected() {
        assert!(
            matches!(
                Discount::try_from(DiscountRequest::StoreCredit { amount: -1 }),
                Err(CheckoutRequestError::NegativeStoreCredit)
            ),
            "expected negative credit to be rejected"
        );
        assert!(
            matches!(
                Discount::try_from(DiscountRequest::PercentageOff { percentage: 101 }),
                Err(CheckoutRequestError::PercentageOutOfRange)
            ),
            "expected >100% to be rejected"
        );
    }

    #[test]
    fn percentage_off_is_whole_percent() -> TestResult {
        let discount = Discount::try_from(DiscountRequest::PercentageOff { percentage: 10 })?;

        assert_eq!(discount.resolve(5_000)?, 500);

        Ok(())
    }
}
