//! Resolve Price Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use presswork::pricing::{
    LinePriceQuote, OptionId, PriceResolution, ProductId, StoreCode, VariantKey,
};

use crate::{
    extensions::*, observability::observe_price_resolution,
    pricing::errors::into_status_error, state::State,
};

fn default_store_code() -> String {
    StoreCode::default().as_str().to_owned()
}

/// Resolve Price Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct ResolvePriceRequest {
    /// Vendor product id
    pub product_id: ProductId,

    /// Vendor store code, `en_us` or `en_ca`
    #[serde(default = "default_store_code")]
    pub store_code: String,

    /// Selected option ids, in any order
    pub option_ids: Vec<OptionId>,

    /// Ask the vendor for a live price when the synced table has none
    #[serde(default)]
    pub live_fallback: bool,
}

/// Resolved Price Response
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct ResolvePriceResponse {
    /// Canonical key the lookup used
    pub variant_key: String,

    /// `local`, `live` or `miss`
    pub source: String,

    /// Unit price in minor units
    pub unit_price: Option<i64>,

    /// When the local price was last synced
    pub synced_at: Option<String>,

    /// Why the lookup missed
    pub miss_reason: Option<String>,
}

impl ResolvePriceResponse {
    fn from_resolution(variant_key: &VariantKey, resolution: PriceResolution) -> Self {
        match resolution {
            PriceResolution::Local {
                unit_price,
                synced_at,
            } => Self {
                variant_key: variant_key.to_string(),
                source: "local".to_owned(),
                unit_price: Some(unit_price),
                synced_at: Some(synced_at.to_string()),
                miss_reason: None,
            },
            PriceResolution::Miss { reason } => Self {
                variant_key: variant_key.to_string(),
                source: "miss".to_owned(),
                unit_price: None,
                synced_at: None,
                miss_reason: Some(reason.as_str().to_owned()),
            },
        }
    }

    fn from_quote(variant_key: &VariantKey, quote: LinePriceQuote) -> Self {
        Self {
            variant_key: variant_key.to_string(),
            source: quote.source.as_str().to_owned(),
            unit_price: Some(quote.unit_price),
            synced_at: None,
            miss_reason: None,
        }
    }
}

/// Resolve Price Handler
///
/// Looks up the synced price for a product configuration, optionally falling
/// back to a live vendor quote.
#[endpoint(
    tags("pricing"),
    summary = "Resolve Variant Price",
    responses(
        (status_code = StatusCode::OK, description = "Price resolved or missed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Live vendor pricing unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ResolvePriceRequest>,
    depot: &mut Depot,
) -> Result<Json<ResolvePriceResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let store = request
        .store_code
        .parse::<StoreCode>()
        .or_400("Invalid store code")?;

    let variant_key = VariantKey::from_option_ids(request.option_ids.iter().copied());

    let response = if request.live_fallback {
        let quote = state
            .app
            .pricing
            .quote_line_price(request.product_id, store, request.option_ids)
            .await
            .map_err(into_status_error)?;

        ResolvePriceResponse::from_quote(&variant_key, quote)
    } else {
        let resolution = state
            .app
            .pricing
            .resolve_price(request.product_id, store, request.option_ids)
            .await
            .map_err(into_status_error)?;

        ResolvePriceResponse::from_resolution(&variant_key, resolution)
    };

    observe_price_resolution(
        &response.source,
        response.miss_reason.as_deref().unwrap_or_default(),
    );

    debug!(
        request_id = depot.request_id(),
        product_id = request.product_id,
        %store,
        variant_key = %variant_key,
        source = %response.source,
        "price resolved"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use presswork::pricing::{MissReason, PriceSource};
    use presswork_app::domain::pricing::{MockPricingService, PricingServiceError, VendorError};

    use crate::test_helpers::pricing_service;

    use super::*;

    fn make_service(pricing: MockPricingService) -> Service {
        pricing_service(pricing, Router::with_path("pricing/resolve").post(handler))
    }

    #[tokio::test]
    async fn test_resolve_local_price() -> TestResult {
        let mut pricing = MockPricingService::new();

        pricing
            .expect_resolve_price()
            .once()
            .withf(|product, store, options| {
                *product == 9 && *store == StoreCode::Canada && *options == [448, 5, 140, 447]
            })
            .return_once(|_, _, _| {
                Ok(PriceResolution::Local {
                    unit_price: 3_120,
                    synced_at: Timestamp::UNIX_EPOCH,
                })
            });

        pricing.expect_quote_line_price().never();

        let mut res = TestClient::post("http://example.com/pricing/resolve")
            .json(&json!({
                "product_id": 9,
                "store_code": "en_ca",
                "option_ids": [448, 5, 140, 447]
            }))
            .send(&make_service(pricing))
            .await;

        let body: ResolvePriceResponse = res.take_json().await?;

        assert_eq!(
            body,
            ResolvePriceResponse {
                variant_key: "5-140-447-448".to_string(),
                source: "local".to_string(),
                unit_price: Some(3_120),
                synced_at: Some(Timestamp::UNIX_EPOCH.to_string()),
                miss_reason: None,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_miss_defaults_to_us_store() -> TestResult {
        let mut pricing = MockPricingService::new();

        pricing
            .expect_resolve_price()
            .once()
            .withf(|_, store, _| *store == StoreCode::UnitedStates)
            .return_once(|_, _, _| {
                Ok(PriceResolution::Miss {
                    reason: MissReason::NotSynced,
                })
            });

        pricing.expect_quote_line_price().never();

        let mut res = TestClient::post("http://example.com/pricing/resolve")
            .json(&json!({ "product_id": 9, "option_ids": [1, 2] }))
            .send(&make_service(pricing))
            .await;

        let body: ResolvePriceResponse = res.take_json().await?;

        assert_eq!(body.source, "miss");
        assert_eq!(body.miss_reason.as_deref(), Some("not_synced"));
        assert_eq!(body.unit_price, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_with_live_fallback() -> TestResult {
        let mut pricing = MockPricingService::new();

        pricing.expect_resolve_price().never();
        pricing
            .expect_quote_line_price()
            .once()
            .return_once(|_, _, _| {
                Ok(LinePriceQuote {
                    unit_price: 4_599,
                    source: PriceSource::Live,
                })
            });

        let mut res = TestClient::post("http://example.com/pricing/resolve")
            .json(&json!({ "product_id": 9, "option_ids": [3], "live_fallback": true }))
            .send(&make_service(pricing))
            .await;

        let body: ResolvePriceResponse = res.take_json().await?;

        assert_eq!(body.source, "live");
        assert_eq!(body.unit_price, Some(4_599));
        assert_eq!(body.variant_key, "3");

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_unknown_store_returns_400() {
        let mut pricing = MockPricingService::new();

        pricing.expect_resolve_price().never();
        pricing.expect_quote_line_price().never();

        let res = TestClient::post("http://example.com/pricing/resolve")
            .json(&json!({ "product_id": 9, "store_code": "en_gb", "option_ids": [3] }))
            .send(&make_service(pricing))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_live_fallback_without_options_returns_400() {
        let mut pricing = MockPricingService::new();

        pricing.expect_resolve_price().never();
        pricing
            .expect_quote_line_price()
            .once()
            .return_once(|_, _, _| Err(PricingServiceError::NoOptions));

        let res = TestClient::post("http://example.com/pricing/resolve")
            .json(&json!({ "product_id": 9, "option_ids": [], "live_fallback": true }))
            .send(&make_service(pricing))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_resolve_vendor_failure_returns_502() {
        let mut pricing = MockPricingService::new();

        pricing.expect_resolve_price().never();
        pricing
            .expect_quote_line_price()
            .once()
            .return_once(|_, _, _| {
                Err(PricingServiceError::Vendor(VendorError::UnexpectedResponse(
                    "503".to_string(),
                )))
            });

        let res = TestClient::post("http://example.com/pricing/resolve")
            .json(&json!({ "product_id": 9, "option_ids": [3], "live_fallback": true }))
            .send(&make_service(pricing))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));
    }
}
