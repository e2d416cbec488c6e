//! Stripe Tax calculations client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use presswork::tax::{TaxAddress, TaxBehavior, TaxCalculation, TaxCalculationRequest};

use super::TaxCalculator;

/// Configuration for the Stripe API.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// API base URL, normally `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key.
    pub secret_key: String,
}

/// HTTP client for `POST /v1/tax/calculations`.
#[derive(Debug, Clone)]
pub struct StripeTaxClient {
    config: StripeConfig,
    http: Client,
}

impl StripeTaxClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl TaxCalculator for StripeTaxClient {
    async fn calculate(
        &self,
        request: &TaxCalculationRequest,
    ) -> Result<TaxCalculation, TaxServiceError> {
        let url = format!("{}/v1/tax/calculations", self.config.api_base);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&calculation_form(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            let message = serde_json::from_str::<StripeErrorBody>(&text)
                .map_or(text, |body| body.error.message);

            return Err(TaxServiceError::UnexpectedResponse(format!(
                "tax calculation failed with status {status}: {message}"
            )));
        }

        let parsed: StripeCalculation = response.json().await?;
        let calculation = parsed.into_calculation()?;

        debug!(
            calculation_id = %calculation.id,
            tax_amount = calculation.tax_amount,
            amount_total = calculation.amount_total,
            "tax calculation created"
        );

        Ok(calculation)
    }
}

/// Flatten a request into Stripe's bracketed form encoding.
fn calculation_form(request: &TaxCalculationRequest) -> Vec<(String, String)> {
    let mut form = vec![
        (
            "currency".to_string(),
            request.currency().iso_alpha_code.to_lowercase(),
        ),
        (
            "customer_details[address_source]".to_string(),
            "shipping".to_string(),
        ),
    ];

    push_address(&mut form, request.address());

    for (index, line) in request.lines().iter().enumerate() {
        let prefix = format!("line_items[{index}]");

        form.push((format!("{prefix}[amount]"), line.amount.to_string()));
        form.push((format!("{prefix}[reference]"), line.reference.to_string()));
        form.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
        form.push((
            format!("{prefix}[tax_behavior]"),
            line.tax_behavior.as_str().to_string(),
        ));

        if let Some(tax_code) = &line.tax_code {
            form.push((format!("{prefix}[tax_code]"), tax_code.clone()));
        }
    }

    if let Some(shipping) = request.shipping() {
        form.push(("shipping_cost[amount]".to_string(), shipping.to_string()));
        form.push((
            "shipping_cost[tax_behavior]".to_string(),
            TaxBehavior::Exclusive.as_str().to_string(),
        ));
    }

    form
}

fn push_address(form: &mut Vec<(String, String)>, address: &TaxAddress) {
    let required = [
        ("country", Some(&address.country)),
        ("postal_code", Some(&address.postal_code)),
    ];

    let optional = [
        ("state", address.state.as_ref()),
        ("city", address.city.as_ref()),
        ("line1", address.line1.as_ref()),
    ];

    for (field, value) in required.into_iter().chain(optional) {
        let Some(value) = value.map(|value| value.trim()).filter(|value| !value.is_empty()) else {
            continue;
        };

        form.push((
            format!("customer_details[address][{field}]"),
            value.to_string(),
        ));
    }
}

#[derive(Debug, Deserialize)]
struct StripeCalculation {
    id: Option<String>,
    amount_total: i64,
    tax_amount_exclusive: i64,
    tax_amount_inclusive: i64,
}

impl StripeCalculation {
    fn into_calculation(self) -> Result<TaxCalculation, TaxServiceError> {
        let id = self.id.ok_or(TaxServiceError::MissingCalculationId)?;

        Ok(TaxCalculation {
            id,
            amount_subtotal: self.amount_total - self.tax_amount_exclusive,
            tax_amount: self.tax_amount_exclusive + self.tax_amount_inclusive,
            amount_total: self.amount_total,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

/// Errors that can occur when communicating with Stripe Tax.
#[derive(Debug, Error)]
pub enum TaxServiceError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned a non-2xx response.
    #[error("unexpected response from Stripe: {0}")]
    UnexpectedResponse(String),

    /// The calculation came back without an id to attach to a payment.
    #[error("tax calculation response had no id")]
    MissingCalculationId,
}
