//! Seeding and resetting the catalog tables.

use farmstead_core::Catalog;
use sqlx::PgPool;
use tracing::info;

use crate::error::DbError;
use crate::rows::{item_kind_to_db, order_status_to_db};

/// Rows inserted by [`CatalogStore::seed`]. Rows that already existed
/// are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// New item rows.
    pub items: u64,
    /// New plant rows.
    pub plants: u64,
    /// New villager rows.
    pub villagers: u64,
    /// New shop listings.
    pub shop_items: u64,
    /// New villager orders.
    pub orders: u64,
}

impl SeedSummary {
    /// Total rows inserted.
    pub const fn total(&self) -> u64 {
        self.items
            .saturating_add(self.plants)
            .saturating_add(self.villagers)
            .saturating_add(self.shop_items)
            .saturating_add(self.orders)
    }
}

/// Operations on the catalog tables.
pub struct CatalogStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogStore<'a> {
    /// Create a new catalog store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert every catalog record that is not already present, in one
    /// transaction. Existing rows (matched by id) are left untouched, so
    /// seeding twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any insert fails, or
    /// [`DbError::OutOfRange`] if a value does not fit its column.
    pub async fn seed(&self, catalog: &Catalog) -> Result<SeedSummary, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut summary = SeedSummary::default();

        for item in &catalog.items {
            let result = sqlx::query(
                "INSERT INTO items (id, name, kind, description) \
                 VALUES ($1, $2, $3::item_kind, $4) ON CONFLICT (id) DO NOTHING",
            )
            .bind(item.id.into_inner())
            .bind(&item.name)
            .bind(item_kind_to_db(item.kind))
            .bind(&item.description)
            .execute(&mut *tx)
            .await?;
            summary.items = summary.items.saturating_add(result.rows_affected());
        }

        for plant in &catalog.plants {
            let result = sqlx::query(
                "INSERT INTO plants (id, name, base_growth_time, water_effect_per_time, \
                 max_water_times, harvest_yield, sell_price, seed_item_id, crop_item_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT (id) DO NOTHING",
            )
            .bind(plant.id.into_inner())
            .bind(&plant.name)
            .bind(to_i32("base_growth_time", plant.base_growth_time)?)
            .bind(to_i32("water_effect_per_time", plant.water_effect_per_time)?)
            .bind(to_i32("max_water_times", plant.max_water_times)?)
            .bind(to_i32("harvest_yield", plant.harvest_yield)?)
            .bind(to_i64("sell_price", plant.sell_price)?)
            .bind(plant.seed_item.into_inner())
            .bind(plant.crop_item.into_inner())
            .execute(&mut *tx)
            .await?;
            summary.plants = summary.plants.saturating_add(result.rows_affected());
        }

        for villager in &catalog.villagers {
            let result = sqlx::query(
                "INSERT INTO villagers (id, name, gender, description) \
                 VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
            )
            .bind(villager.id.into_inner())
            .bind(&villager.name)
            .bind(&villager.gender)
            .bind(&villager.description)
            .execute(&mut *tx)
            .await?;
            summary.villagers = summary.villagers.saturating_add(result.rows_affected());
        }

        for listing in &catalog.shop {
            let result = sqlx::query(
                "INSERT INTO shop_items (item_id, price) VALUES ($1, $2) \
                 ON CONFLICT (item_id) DO NOTHING",
            )
            .bind(listing.item.into_inner())
            .bind(to_i64("price", listing.price)?)
            .execute(&mut *tx)
            .await?;
            summary.shop_items = summary.shop_items.saturating_add(result.rows_affected());
        }

        for order in &catalog.orders {
            let result = sqlx::query(
                "INSERT INTO villager_orders (id, villager_id, required_item_id, \
                 required_quantity, reward_gold, reward_affection, status, posted_at, expires_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7::order_status, $8, $9) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(order.id.into_inner())
            .bind(order.villager.into_inner())
            .bind(order.required_item.into_inner())
            .bind(to_i32("required_quantity", order.required_quantity)?)
            .bind(to_i64("reward_gold", order.reward_gold)?)
            .bind(to_i32("reward_affection", order.reward_affection)?)
            .bind(order_status_to_db(order.status))
            .bind(order.posted_at)
            .bind(order.expires_at)
            .execute(&mut *tx)
            .await?;
            summary.orders = summary.orders.saturating_add(result.rows_affected());
        }

        tx.commit().await?;
        info!(
            items = summary.items,
            plants = summary.plants,
            villagers = summary.villagers,
            shop_items = summary.shop_items,
            orders = summary.orders,
            "Catalog seeded"
        );
        Ok(summary)
    }

    /// Delete every row from every farm table, player data and catalog
    /// alike. The schema and migration history are kept.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the truncate fails.
    pub async fn reset(&self) -> Result<(), DbError> {
        sqlx::query(
            "TRUNCATE gold_transactions, villager_orders, affection, inventory, plots, \
             players, shop_items, plants, villagers, items",
        )
        .execute(self.pool)
        .await?;
        info!("All farm tables truncated");
        Ok(())
    }
}

fn to_i32(field: &'static str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_err| DbError::OutOfRange {
        field,
        value: u64::from(value),
    })
}

fn to_i64(field: &'static str, value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_err| DbError::OutOfRange { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_totals_every_table() {
        let summary = SeedSummary {
            items: 7,
            plants: 3,
            villagers: 2,
            shop_items: 2,
            orders: 2,
        };
        assert_eq!(summary.total(), 16);
        assert_eq!(SeedSummary::default().total(), 0);
    }

    #[test]
    fn oversized_catalog_values_are_out_of_range() {
        assert!(matches!(
            to_i32("harvest_yield", u32::MAX),
            Err(DbError::OutOfRange { field: "harvest_yield", .. })
        ));
        assert!(to_i64("price", u64::MAX).is_err());
        assert!(matches!(to_i64("price", 5), Ok(5)));
    }
}
