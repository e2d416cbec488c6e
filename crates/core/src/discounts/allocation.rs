//! Discount allocation across cart lines.

use smallvec::SmallVec;

use crate::lines::{CartLine, LineReference};

/// Per-line share of an applied discount, in line iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountAllocation {
    applied: i64,
    shares: SmallVec<[(LineReference, i64); 10]>,
}

impl DiscountAllocation {
    /// The discount actually applied: `min(requested, subtotal)`.
    pub fn applied(&self) -> i64 {
        self.applied
    }

    /// Amount allocated to the given line, if it took part in the allocation.
    pub fn get(&self, reference: &str) -> Option<i64> {
        self.shares
            .iter()
            .find(|(line, _)| line.as_str() == reference)
            .map(|(_, amount)| *amount)
    }

    /// Net amount for a line once its allocation is taken off.
    pub fn net_amount(&self, line: &CartLine) -> i64 {
        line.amount() - self.get(line.reference().as_str()).unwrap_or(0)
    }

    /// Iterate over `(reference, allocated)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&LineReference, i64)> {
        self.shares.iter().map(|(line, amount)| (line, *amount))
    }

    /// Sum of all allocations.
    pub fn total(&self) -> i64 {
        self.shares.iter().map(|(_, amount)| amount).sum()
    }

    /// Number of lines holding an allocation.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Whether no line holds an allocation.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Spread `discount` proportionally over the positive-amount lines.
///
/// Every line but the last receives `floor(applied * amount / subtotal)`; the
/// last line takes whatever is left so the allocations always sum to
/// `applied`. Input order decides which line absorbs the rounding remainder.
pub fn allocate_discount(lines: &[CartLine], discount: i64) -> DiscountAllocation {
    let eligible: SmallVec<[(&LineReference, i64); 10]> = lines
        .iter()
        .filter(|line| line.amount() > 0)
        .map(|line| (line.reference(), line.amount()))
        .collect();

    // Line totals can sum past i64::MAX; the applied amount never does.
    let subtotal: i128 = eligible.iter().map(|(_, amount)| i128::from(*amount)).sum();

    let applied = i64::try_from(i128::from(discount).min(subtotal)).unwrap_or(discount);

    let Some(last) = eligible.len().checked_sub(1) else {
        return DiscountAllocation::default();
    };

    if applied <= 0 {
        return DiscountAllocation::default();
    }

    let mut shares: SmallVec<[(LineReference, i64); 10]> = SmallVec::with_capacity(eligible.len());
    let mut allocated = 0_i128;

    for (index, &(reference, amount)) in eligible.iter().enumerate() {
        let share = if index == last {
            i64::try_from(i128::from(applied) - allocated).unwrap_or(0)
        } else {
            floor_share(applied, amount, subtotal)
        }
        .clamp(0, amount);

        allocated += i128::from(share);

        shares.push((reference.clone(), share));
    }

    // Clamping the last line can leave a shortfall; earlier lines with
    // headroom take it in order.
    let mut shortfall = i64::try_from(i128::from(applied) - allocated).unwrap_or(0);

    for ((_, share), &(_, amount)) in shares.iter_mut().zip(eligible.iter()) {
        if shortfall <= 0 {
            break;
        }

        let top_up = (amount - *share).min(shortfall);

        *share += top_up;
        shortfall -= top_up;
    }

    DiscountAllocation { applied, shares }
}

/// `floor(total * part / denom)` without intermediate overflow.
fn floor_share(total: i64, part: i64, denom: i128) -> i64 {
    if denom <= 0 {
        return 0;
    }

    let value = i128::from(total) * i128::from(part) / denom;

    i64::try_from(value).unwrap_or(0)
}
