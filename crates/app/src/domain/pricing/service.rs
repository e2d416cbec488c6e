//! Pricing service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use presswork::pricing::{
    LinePriceQuote, MissReason, OptionId, PriceResolution, PriceSource, ProductId, StoreCode,
    VariantKey, canonical_option_ids,
};

use crate::domain::pricing::{
    errors::PricingServiceError, repository::VariantPrices, vendor::VendorPricing,
};

#[derive(Clone)]
pub struct LocalPricingService {
    prices: Arc<dyn VariantPrices>,
    vendor: Arc<dyn VendorPricing>,
}

impl LocalPricingService {
    #[must_use]
    pub fn new(prices: Arc<dyn VariantPrices>, vendor: Arc<dyn VendorPricing>) -> Self {
        Self { prices, vendor }
    }
}

#[async_trait]
impl PricingService for LocalPricingService {
    async fn resolve_price(
        &self,
        product: ProductId,
        store: StoreCode,
        option_ids: Vec<OptionId>,
    ) -> Result<PriceResolution, PricingServiceError> {
        let key = VariantKey::from_option_ids(option_ids);

        if key.is_empty() {
            return Ok(PriceResolution::Miss {
                reason: MissReason::NoOptions,
            });
        }

        let row = self.prices.find_price(product, store, &key).await?;
        let resolution = PriceResolution::from_lookup(row);

        debug!(product, %store, variant_key = %key, ?resolution, "resolved local price");

        Ok(resolution)
    }

    async fn quote_line_price(
        &self,
        product: ProductId,
        store: StoreCode,
        option_ids: Vec<OptionId>,
    ) -> Result<LinePriceQuote, PricingServiceError> {
        let options = canonical_option_ids(option_ids);

        match self.resolve_price(product, store, options.to_vec()).await? {
            PriceResolution::Local { unit_price, .. } => {
                return Ok(LinePriceQuote {
                    unit_price,
                    source: PriceSource::Local,
                });
            }
            PriceResolution::Miss {
                reason: MissReason::NoOptions,
            } => return Err(PricingServiceError::NoOptions),
            PriceResolution::Miss { .. } => {}
        }

        info!(product, %store, "local price miss, falling back to live vendor price");

        let unit_price = self.vendor.live_price(product, store, &options).await?;

        Ok(LinePriceQuote {
            unit_price,
            source: PriceSource::Live,
        })
    }
}

#[automock]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Look up the synced price for a configuration. Never calls the vendor.
    async fn resolve_price(
        &self,
        product: ProductId,
        store: StoreCode,
        option_ids: Vec<OptionId>,
    ) -> Result<PriceResolution, PricingServiceError>;

    /// Price a configuration, asking the vendor live when the lookup misses.
    ///
    /// The vendor receives the canonical option ids. A configuration with no
    /// options is rejected with [`PricingServiceError::NoOptions`].
    async fn quote_line_price(
        &self,
        product: ProductId,
        store: StoreCode,
        option_ids: Vec<OptionId>,
    ) -> Result<LinePriceQuote, PricingServiceError>;
}
