//! App Router

use salvo::Router;

use crate::{checkout, pricing};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("checkout")
                .push(Router::with_path("quote").post(checkout::quote::handler))
                .push(Router::with_path("reconcile").post(checkout::reconcile::handler)),
        )
        .push(Router::with_path("pricing/resolve").post(pricing::resolve::handler))
}
