//! Checkout Reconcile Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use presswork::tax::ReconciledTax;

use crate::{checkout::requests::ReconcileRequest, extensions::*, state::State};

/// Reconciled Tax Response
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct ReconcileResponse {
    /// Tax recovered from the settled total, in minor units
    pub tax: i64,

    /// Whether the tax came from a settled total rather than defaulting to zero
    pub reconciled_with_stripe: bool,
}

impl From<ReconciledTax> for ReconcileResponse {
    fn from(reconciled: ReconciledTax) -> Self {
        Self {
            tax: reconciled.tax,
            reconciled_with_stripe: reconciled.reconciled_with_stripe,
        }
    }
}

/// Checkout Reconcile Handler
///
/// Derives the tax actually charged from a settled payment total.
#[endpoint(
    tags("checkout"),
    summary = "Reconcile Settled Tax",
    responses(
        (status_code = StatusCode::OK, description = "Tax reconciled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ReconcileRequest>,
    depot: &mut Depot,
) -> Result<Json<ReconcileResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let reconciled = state.app.checkout.reconcile(json.into_inner().into());

    Ok(Json(reconciled.into()))
}
