//! Checkout Quote Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use presswork::tax::TaxableLine;
use presswork_app::domain::checkout::models::{CheckoutQuote, CheckoutRequest};

use crate::{
    checkout::{errors::into_status_error, requests::QuoteRequest},
    extensions::*,
    observability::observe_checkout_quote,
    state::State,
};

/// Discount share held by one line
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct AllocationResponse {
    pub reference: String,
    pub amount: i64,
}

/// Post-discount line as sent for tax calculation
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct TaxableLineResponse {
    pub reference: String,

    /// Net amount in minor units
    pub amount: i64,

    pub quantity: u32,
    pub tax_code: Option<String>,
}

impl From<TaxableLine> for TaxableLineResponse {
    fn from(line: TaxableLine) -> Self {
        Self {
            reference: line.reference.to_string(),
            amount: line.amount,
            quantity: line.quantity,
            tax_code: line.tax_code,
        }
    }
}

/// Checkout Quote Response
///
/// All amounts are integer minor units of `currency`.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct QuoteResponse {
    /// Lowercase ISO 4217 code
    pub currency: String,

    /// Tax calculation to attach to the payment, absent for free orders
    pub calculation_id: Option<String>,

    pub subtotal: i64,
    pub applied_discount: i64,
    pub allocations: Vec<AllocationResponse>,
    pub taxable_lines: Vec<TaxableLineResponse>,
    pub net_subtotal: i64,
    pub shipping: i64,
    pub tax: i64,
    pub total: i64,

    /// Total formatted for display, e.g. `$74.47`
    pub total_display: String,

    /// Whether nothing was left to tax after discounts
    pub free_order: bool,
}

impl From<CheckoutQuote> for QuoteResponse {
    fn from(quote: CheckoutQuote) -> Self {
        let total_display = quote.display(quote.total);
        let free_order = quote.is_free_order();

        Self {
            currency: quote.currency.iso_alpha_code.to_lowercase(),
            calculation_id: quote.calculation_id,
            subtotal: quote.subtotal,
            applied_discount: quote.applied_discount,
            allocations: quote
                .allocations
                .into_iter()
                .map(|(reference, amount)| AllocationResponse {
                    reference: reference.to_string(),
                    amount,
                })
                .collect(),
            taxable_lines: quote
                .taxable_lines
                .into_iter()
                .map(TaxableLineResponse::from)
                .collect(),
            net_subtotal: quote.net_subtotal,
            shipping: quote.shipping,
            tax: quote.tax,
            total: quote.total,
            total_display,
            free_order,
        }
    }
}

/// Checkout Quote Handler
///
/// Allocates the discount across lines, calculates tax on the net lines and
/// totals the order.
#[endpoint(
    tags("checkout"),
    summary = "Quote Checkout",
    responses(
        (status_code = StatusCode::OK, description = "Checkout quoted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Tax calculation unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<QuoteRequest>,
    depot: &mut Depot,
) -> Result<Json<QuoteResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let request = CheckoutRequest::try_from(json.into_inner()).or_400("Invalid checkout request")?;

    let quote = state
        .app
        .checkout
        .quote(request)
        .await
        .map_err(into_status_error)?;

    let outcome = if quote.is_free_order() {
        "free_order"
    } else {
        "taxed"
    };

    observe_checkout_quote(outcome);

    info!(
        request_id = depot.request_id(),
        outcome,
        applied_discount = quote.applied_discount,
        tax = quote.tax,
        total = quote.total,
        "checkout quoted"
    );

    Ok(Json(quote.into()))
}

#[cfg(test)]
mod tests {
    use presswork::lines::{CartLine, LineReference};
    use rusty_money::iso::USD;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use presswork_app::domain::{
        checkout::{CheckoutServiceError, MockCheckoutService},
        tax::TaxServiceError,
    };

    use crate::test_helpers::checkout_service;

    use super::*;

    fn make_service(checkout: MockCheckoutService) -> Service {
        checkout_service(checkout, Router::with_path("checkout/quote").post(handler))
    }

    fn body() -> serde_json::Value {
        json!({
            "currency": "usd",
            "address": { "country": "US", "postal_code": "94107" },
            "lines": [
                { "reference": "A", "price": { "type": "line_total", "amount": 1000 } },
                { "reference": "B", "price": { "type": "unit_price", "unit_amount": 1000, "quantity": 2 } }
            ],
            "discount": { "type": "store_credit", "amount": 300 },
            "shipping": 995
        })
    }

    fn taxed_quote() -> CheckoutQuote {
        CheckoutQuote {
            currency: USD,
            calculation_id: Some("taxcalc_1".to_string()),
            subtotal: 3_000,
            applied_discount: 300,
            allocations: vec![(LineReference::from("A"), 100), (LineReference::from("B"), 200)],
            taxable_lines: vec![TaxableLine::new("A", 900), TaxableLine::new("B", 1_800)],
            net_subtotal: 2_700,
            shipping: 995,
            tax: 240,
            total: 3_935,
        }
    }

    #[tokio::test]
    async fn test_quote_success() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_quote()
            .once()
            .withf(|request| {
                request.currency == "usd"
                    && request.shipping == 995
                    && request.lines.iter().map(CartLine::amount).collect::<Vec<_>>()
                        == [1_000, 2_000]
            })
            .return_once(|_| Ok(taxed_quote()));

        checkout.expect_reconcile().never();

        let mut res = TestClient::post("http://example.com/checkout/quote")
            .json(&body())
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let quote: QuoteResponse = res.take_json().await?;

        assert_eq!(quote.currency, "usd");
        assert_eq!(quote.calculation_id.as_deref(), Some("taxcalc_1"));
        assert_eq!(quote.total, 3_935);
        assert_eq!(quote.total_display, "$39.35");
        assert_eq!(
            quote.allocations,
            vec![
                AllocationResponse {
                    reference: "A".to_string(),
                    amount: 100
                },
                AllocationResponse {
                    reference: "B".to_string(),
                    amount: 200
                },
            ]
        );
        assert!(!quote.free_order);

        Ok(())
    }

    #[tokio::test]
    async fn test_quote_free_order() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_quote().once().return_once(|_| {
            Ok(CheckoutQuote {
                calculation_id: None,
                applied_discount: 3_000,
                allocations: vec![
                    (LineReference::from("A"), 1_000),
                    (LineReference::from("B"), 2_000),
                ],
                taxable_lines: Vec::new(),
                net_subtotal: 0,
                shipping: 0,
                tax: 0,
                total: 0,
                ..taxed_quote()
            })
        });

        checkout.expect_reconcile().never();

        let mut res = TestClient::post("http://example.com/checkout/quote")
            .json(&body())
            .send(&make_service(checkout))
            .await;

        let quote: QuoteResponse = res.take_json().await?;

        assert!(quote.free_order);
        assert!(quote.taxable_lines.is_empty());
        assert_eq!(quote.total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_quote_invalid_line_returns_400() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_quote().never();
        checkout.expect_reconcile().never();

        let res = TestClient::post("http://example.com/checkout/quote")
            .json(&json!({
                "currency": "usd",
                "address": { "country": "US", "postal_code": "94107" },
                "lines": [
                    { "reference": "A", "price": { "type": "line_total", "amount": -5 } }
                ]
            }))
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_quote_missing_address_returns_400() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_quote()
            .once()
            .return_once(|_| Err(CheckoutServiceError::InvalidAddress));

        checkout.expect_reconcile().never();

        let res = TestClient::post("http://example.com/checkout/quote")
            .json(&body())
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_quote_tax_failure_returns_502() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_quote().once().return_once(|_| {
            Err(CheckoutServiceError::TaxService(
                TaxServiceError::UnexpectedResponse("rate limited".to_string()),
            ))
        });

        checkout.expect_reconcile().never();

        let res = TestClient::post("http://example.com/checkout/quote")
            .json(&body())
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }
}
