//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};

use presswork_app::domain::{checkout::MockCheckoutService, pricing::MockPricingService};

use crate::{observability::request_logging, state::State};

fn strict_pricing_mock() -> MockPricingService {
    let mut pricing = MockPricingService::new();

    pricing.expect_resolve_price().never();
    pricing.expect_quote_line_price().never();

    pricing
}

fn strict_checkout_mock() -> MockCheckoutService {
    let mut checkout = MockCheckoutService::new();

    checkout.expect_quote().never();
    checkout.expect_reconcile().never();

    checkout
}

fn service_with_state(state: State, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(Arc::new(state)))
            .hoop(request_logging)
            .push(route),
    )
}

pub(crate) fn pricing_service(pricing: MockPricingService, route: Router) -> Service {
    service_with_state(
        State::new(Arc::new(pricing), Arc::new(strict_checkout_mock())),
        route,
    )
}

pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    service_with_state(
        State::new(Arc::new(strict_pricing_mock()), Arc::new(checkout)),
        route,
    )
}
