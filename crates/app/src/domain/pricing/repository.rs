//! Variant Prices Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{PgPool, Postgres, Row, postgres::PgRow, query};

use presswork::pricing::{ProductId, StoreCode, VariantKey, VariantPrice};

const FIND_VARIANT_PRICE_SQL: &str = include_str!("sql/find_variant_price.sql");

/// Read access to the synced vendor pricing table.
#[automock]
#[async_trait]
pub trait VariantPrices: Send + Sync {
    /// Find the synced price for a product configuration.
    async fn find_price(
        &self,
        product: ProductId,
        store: StoreCode,
        key: &VariantKey,
    ) -> Result<Option<VariantPrice>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgVariantPrices {
    pool: PgPool,
}

impl PgVariantPrices {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VariantPrices for PgVariantPrices {
    async fn find_price(
        &self,
        product: ProductId,
        store: StoreCode,
        key: &VariantKey,
    ) -> Result<Option<VariantPrice>, sqlx::Error> {
        query::<Postgres>(FIND_VARIANT_PRICE_SQL)
            .bind(i64::from(product))
            .bind(store.as_str())
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(variant_price_from_row)
            .transpose()
    }
}

fn variant_price_from_row(row: &PgRow) -> Result<VariantPrice, sqlx::Error> {
    let unit_price: i64 = row.try_get("unit_price")?;

    if unit_price < 0 {
        return Err(sqlx::Error::ColumnDecode {
            index: "unit_price".to_string(),
            source: format!("negative unit price {unit_price}").into(),
        });
    }

    Ok(VariantPrice {
        unit_price,
        synced_at: row.try_get::<SqlxTimestamp, _>("synced_at")?.to_jiff(),
    })
}
