//! SinaLite live pricing client.

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use presswork::pricing::{OptionId, PriceParseError, ProductId, StoreCode, vendor_price_to_minor};

/// Tokens are refreshed this long before the vendor says they expire.
const TOKEN_EXPIRY_MARGIN: SignedDuration = SignedDuration::from_secs(60);

/// Live vendor pricing, used when the synced table has no price.
#[automock]
#[async_trait]
pub trait VendorPricing: Send + Sync {
    /// Price one unit of the given configuration, in minor units.
    async fn live_price(
        &self,
        product: ProductId,
        store: StoreCode,
        option_ids: &[OptionId],
    ) -> Result<i64, VendorError>;
}

/// Configuration for the SinaLite API.
#[derive(Debug, Clone)]
pub struct SinaliteConfig {
    /// API base URL, e.g. `"https://api.sinaliteuppy.com"`.
    pub api_base: String,

    /// OAuth client id.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// OAuth audience.
    pub audience: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Timestamp,
}

/// HTTP client for SinaLite pricing.
#[derive(Debug)]
pub struct SinaliteClient {
    config: SinaliteConfig,
    http: Client,
    token: Mutex<Option<CachedToken>>,
}

impl SinaliteClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: SinaliteConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, VendorError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref()
            && token.expires_at > Timestamp::now()
        {
            return Ok(token.access_token.clone());
        }

        let url = format!("{}/auth/token", self.config.api_base);

        let response = self
            .http
            .post(&url)
            .json(&TokenRequest {
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                audience: &self.config.audience,
                grant_type: "client_credentials",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(VendorError::UnexpectedResponse(format!(
                "token request failed with status {status}: {text}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;

        *cached = token_expiry(parsed.expires_in).map(|expires_at| CachedToken {
            access_token: parsed.access_token.clone(),
            expires_at,
        });

        Ok(parsed.access_token)
    }
}

#[async_trait]
impl VendorPricing for SinaliteClient {
    async fn live_price(
        &self,
        product: ProductId,
        store: StoreCode,
        option_ids: &[OptionId],
    ) -> Result<i64, VendorError> {
        let token = self.access_token().await?;

        let url = format!("{}/price/{product}/{store}", self.config.api_base);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&PriceRequest {
                product_options: option_ids,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(VendorError::UnexpectedResponse(format!(
                "price request failed with status {status}: {text}"
            )));
        }

        let parsed: PriceResponse = response.json().await?;
        let unit_price = vendor_price_to_minor(&parsed.price.into_string())?;

        debug!(product, %store, unit_price, "live vendor price");

        Ok(unit_price)
    }
}

fn token_expiry(expires_in: Option<i64>) -> Option<Timestamp> {
    let lifetime = SignedDuration::from_secs(expires_in?).checked_sub(TOKEN_EXPIRY_MARGIN)?;

    if lifetime.is_negative() {
        return None;
    }

    Timestamp::now().checked_add(lifetime).ok()
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceRequest<'a> {
    product_options: &'a [OptionId],
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: VendorPriceValue,
}

/// The vendor sends prices as strings but has been seen sending bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VendorPriceValue {
    Text(String),
    Number(serde_json::Number),
}

impl VendorPriceValue {
    fn into_string(self) -> String {
        match self {
            VendorPriceValue::Text(text) => text,
            VendorPriceValue::Number(number) => number.to_string(),
        }
    }
}

/// Errors that can occur when communicating with SinaLite.
#[derive(Debug, Error)]
pub enum VendorError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// SinaLite returned a non-2xx response.
    #[error("unexpected response from SinaLite: {0}")]
    UnexpectedResponse(String),

    /// The returned price could not be converted to minor units.
    #[error(transparent)]
    InvalidPrice(#[from] PriceParseError),
}
