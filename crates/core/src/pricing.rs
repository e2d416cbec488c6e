//! Pricing
//!
//! Vendor products are priced per configuration. A configuration is a set of
//! option ids; the vendor's canonical key for it is the ascending,
//! de-duplicated ids joined with `-`. Prices synced ahead of time are looked up
//! by `(product, store, variant key)`.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

const VARIANT_KEY_DELIMITER: &str = "-";

/// Vendor product identifier.
pub type ProductId = u32;

/// Vendor option identifier.
pub type OptionId = u32;

/// Errors parsing vendor price values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    /// The value was not a decimal number.
    #[error("vendor price {0:?} is not a decimal number")]
    NotDecimal(String),

    /// The value was negative or did not fit in minor units.
    #[error("vendor price {0:?} is out of range")]
    OutOfRange(String),
}

/// Errors parsing store codes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown store code {0:?}")]
pub struct UnknownStoreCode(pub String);

/// Vendor storefront a price was synced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreCode {
    /// United States storefront, USD prices.
    #[default]
    #[serde(rename = "en_us")]
    UnitedStates,

    /// Canadian storefront, CAD prices.
    #[serde(rename = "en_ca")]
    Canada,
}

impl StoreCode {
    /// Vendor wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreCode::UnitedStates => "en_us",
            StoreCode::Canada => "en_ca",
        }
    }
}

impl fmt::Display for StoreCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreCode {
    type Err = UnknownStoreCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "en_us" => Ok(StoreCode::UnitedStates),
            "en_ca" => Ok(StoreCode::Canada),
            other => Err(UnknownStoreCode(other.to_owned())),
        }
    }
}

/// Option ids in canonical order: ascending, without duplicates.
pub fn canonical_option_ids(
    option_ids: impl IntoIterator<Item = OptionId>,
) -> SmallVec<[OptionId; 16]> {
    let mut ids: SmallVec<[OptionId; 16]> = option_ids.into_iter().collect();

    ids.sort_unstable();
    ids.dedup();

    ids
}

/// Canonical key for a product configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    /// Sort, de-duplicate and join option ids.
    pub fn from_option_ids(option_ids: impl IntoIterator<Item = OptionId>) -> Self {
        let key = canonical_option_ids(option_ids)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(VARIANT_KEY_DELIMITER);

        Self(key)
    }

    /// The key as stored in the pricing table.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the configuration had no options at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A synced price row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPrice {
    /// Unit price in minor units.
    pub unit_price: i64,

    /// When the sync process last wrote this row.
    pub synced_at: Timestamp,
}

/// Why a local lookup produced no price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// No options were selected, so there is no variant to look up.
    NoOptions,

    /// The configuration has not been synced.
    NotSynced,
}

impl MissReason {
    /// Reason code reported to callers.
    pub fn as_str(self) -> &'static str {
        match self {
            MissReason::NoOptions => "no_options",
            MissReason::NotSynced => "not_synced",
        }
    }
}

/// Outcome of a local price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PriceResolution {
    /// Found in the synced pricing table.
    Local {
        /// Unit price in minor units.
        unit_price: i64,

        /// When the price was synced.
        synced_at: Timestamp,
    },

    /// Not found locally; the caller decides whether to ask the vendor.
    Miss {
        /// Why the lookup missed.
        reason: MissReason,
    },
}

impl PriceResolution {
    /// Turn a table lookup result into a resolution.
    pub fn from_lookup(row: Option<VariantPrice>) -> Self {
        match row {
            Some(VariantPrice {
                unit_price,
                synced_at,
            }) => PriceResolution::Local {
                unit_price,
                synced_at,
            },
            None => PriceResolution::Miss {
                reason: MissReason::NotSynced,
            },
        }
    }

    /// Unit price on a hit.
    pub fn unit_price(&self) -> Option<i64> {
        match self {
            PriceResolution::Local { unit_price, .. } => Some(*unit_price),
            PriceResolution::Miss { .. } => None,
        }
    }
}

/// Where a quoted line price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// The synced pricing table.
    Local,

    /// A live vendor pricing call.
    Live,
}

impl PriceSource {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            PriceSource::Local => "local",
            PriceSource::Live => "live",
        }
    }
}

/// A unit price with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePriceQuote {
    /// Unit price in minor units.
    pub unit_price: i64,

    /// Where the price came from.
    pub source: PriceSource,
}

/// Convert a vendor decimal price (`"99.07"`) into minor units.
///
/// Fractions of a minor unit round half away from zero.
///
/// # Errors
///
/// - [`PriceParseError::NotDecimal`]: the value is not a decimal number.
/// - [`PriceParseError::OutOfRange`]: the value is negative or too large.
pub fn vendor_price_to_minor(value: &str) -> Result<i64, PriceParseError> {
    let trimmed = value.trim();

    let price =
        Decimal::from_str(trimmed).map_err(|_parse| PriceParseError::NotDecimal(trimmed.to_owned()))?;

    if price.is_sign_negative() {
        return Err(PriceParseError::OutOfRange(trimmed.to_owned()));
    }

    price
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| PriceParseError::OutOfRange(trimmed.to_owned()))
}
