//! Checkout service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rusty_money::iso::{self, Currency};
use tracing::{debug, info, warn};

use presswork::{
    checkout::CheckoutPlan,
    tax::{ReconciledTax, TaxRequestError, reconcile_tax},
};

use crate::domain::{
    checkout::{
        errors::CheckoutServiceError,
        models::{CheckoutQuote, CheckoutRequest, Settlement},
    },
    tax::TaxCalculator,
};

#[derive(Clone)]
pub struct HostedTaxCheckoutService {
    tax: Arc<dyn TaxCalculator>,
}

impl HostedTaxCheckoutService {
    #[must_use]
    pub fn new(tax: Arc<dyn TaxCalculator>) -> Self {
        Self { tax }
    }
}

#[async_trait]
impl CheckoutService for HostedTaxCheckoutService {
    async fn quote(&self, request: CheckoutRequest) -> Result<CheckoutQuote, CheckoutServiceError> {
        let currency = find_currency(&request.currency)?;
        let plan = CheckoutPlan::build(request.lines, &request.discount, request.shipping)?;

        match plan.tax_request(currency, request.address) {
            Ok(tax_request) => {
                let calculation = self.tax.calculate(&tax_request).await?;

                Ok(CheckoutQuote::taxed(currency, &plan, calculation))
            }
            Err(TaxRequestError::NoTaxableLines) => {
                info!(
                    subtotal = plan.subtotal(),
                    applied_discount = plan.applied_discount(),
                    "nothing taxable, quoting free order"
                );

                Ok(CheckoutQuote::untaxed(currency, &plan))
            }
            Err(TaxRequestError::InvalidAddress) => Err(CheckoutServiceError::InvalidAddress),
        }
    }

    fn reconcile(&self, settlement: Settlement) -> ReconciledTax {
        let reconciled = reconcile_tax(
            settlement.settled_total,
            settlement.net_subtotal,
            settlement.shipping,
        );

        if reconciled.reconciled_with_stripe {
            debug!(
                tax = reconciled.tax,
                net_subtotal = settlement.net_subtotal,
                shipping = settlement.shipping,
                "tax reconciled from settled total"
            );
        } else {
            warn!(
                net_subtotal = settlement.net_subtotal,
                shipping = settlement.shipping,
                "no settled total, tax left unreconciled"
            );
        }

        reconciled
    }
}

fn find_currency(code: &str) -> Result<&'static Currency, CheckoutServiceError> {
    iso::find(&code.trim().to_uppercase())
        .ok_or_else(|| CheckoutServiceError::UnknownCurrency(code.to_owned()))
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Allocate the discount, calculate tax and total the order.
    async fn quote(&self, request: CheckoutRequest) -> Result<CheckoutQuote, CheckoutServiceError>;

    /// Derive tax from a settled charge when the calculation is unavailable.
    fn reconcile(&self, settlement: Settlement) -> ReconciledTax;
}
