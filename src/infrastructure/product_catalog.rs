use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{ProductPricing, ProductSummary};
use crate::domain::ports::ProductCatalog;
use crate::schema::products;

use super::models::ProductRow;

impl From<ProductRow> for ProductSummary {
    fn from(row: ProductRow) -> Self {
        ProductSummary {
            id: row.id,
            name: row.name,
            price: row.price,
            image_url: row.image_url,
            loyalty_point_rate: row.loyalty_points,
        }
    }
}

pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn pricing_for(&self, ids: &[Uuid]) -> Result<Vec<ProductPricing>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get()?;

        // Price and rate only; the rest of the row is not needed here.
        let rows: Vec<(Uuid, BigDecimal, i32)> = products::table
            .filter(products::id.eq_any(ids))
            .select((products::id, products::price, products::loyalty_points))
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(id, price, loyalty_point_rate)| ProductPricing {
                id,
                price,
                loyalty_point_rate,
            })
            .collect())
    }
}
