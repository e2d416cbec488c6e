//! State

use std::sync::Arc;

use presswork_app::{
    context::AppContext,
    domain::{checkout::CheckoutService, pricing::PricingService},
};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
}

impl State {
    #[cfg(test)]
    pub(crate) fn new(pricing: Arc<dyn PricingService>, checkout: Arc<dyn CheckoutService>) -> Self {
        Self {
            app: AppContext { pricing, checkout },
        }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self { app })
    }
}
