//! Post-settlement tax reconciliation.

use serde::{Deserialize, Serialize};

/// Tax derived from a settled charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledTax {
    /// Implied tax in minor units. Zero when the settlement is unknown.
    pub tax: i64,

    /// `false` when no settled total was available and `tax` is a placeholder.
    pub reconciled_with_stripe: bool,
}

impl ReconciledTax {
    /// The degraded result used when no settled total is known.
    pub const UNKNOWN: Self = Self {
        tax: 0,
        reconciled_with_stripe: false,
    };
}

/// Back-compute tax from the processor's settled total.
///
/// Assumes `settled_total == net_subtotal + shipping + tax`; any processor
/// rounding or extra fee ends up in the returned tax.
pub fn reconcile_tax(settled_total: Option<i64>, net_subtotal: i64, shipping: i64) -> ReconciledTax {
    let Some(settled_total) = settled_total else {
        return ReconciledTax::UNKNOWN;
    };

    let tax = settled_total
        .saturating_sub(net_subtotal.saturating_add(shipping))
        .max(0);

    ReconciledTax {
        tax,
        reconciled_with_stripe: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_total_recovers_tax() {
        for (subtotal, shipping, tax) in [(0, 0, 0), (6_000, 995, 541), (1, 0, 0), (12_345, 0, 1_018)] {
            let reconciled = reconcile_tax(Some(subtotal + shipping + tax), subtotal, shipping);

            assert_eq!(reconciled.tax, tax);
            assert!(reconciled.reconciled_with_stripe);
        }
    }

    #[test]
    fn missing_total_degrades() {
        assert_eq!(reconcile_tax(None, 6_000, 995), ReconciledTax::UNKNOWN);
    }

    #[test]
    fn short_settlement_never_goes_negative() {
        let reconciled = reconcile_tax(Some(5_000), 6_000, 995);

        assert_eq!(reconciled.tax, 0);
        assert!(reconciled.reconciled_with_stripe);
    }

    #[test]
    fn extreme_inputs_saturate() {
        let reconciled = reconcile_tax(Some(i64::MAX), i64::MIN, -1);

        assert_eq!(reconciled.tax, i64::MAX);
    }
}
