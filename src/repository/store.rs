//! Store repository

use crate::domain::Store;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Insert when `store.id` is `None`, otherwise overwrite the row with that id
    async fn save(&self, store: &Store) -> Result<Store>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Store>>;
    async fn find_all(&self) -> Result<Vec<Store>>;
    /// Remove the row if present; absent ids are not an error
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

pub struct StoreRepositoryImpl {
    pool: MySqlPool,
}

impl StoreRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for StoreRepositoryImpl {
    async fn save(&self, store: &Store) -> Result<Store> {
        let id = match store.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO store (code, name, address, opened, province, city, district,
                                       road_address, lot_address, latitude, longitude)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&store.code)
                .bind(&store.name)
                .bind(&store.address)
                .bind(store.opened)
                .bind(&store.province)
                .bind(&store.city)
                .bind(&store.district)
                .bind(&store.road_address)
                .bind(&store.lot_address)
                .bind(store.latitude)
                .bind(store.longitude)
                .execute(&self.pool)
                .await?;

                result.last_insert_id() as i64
            }
            Some(id) => {
                // Re-inserts with the same id if the row vanished since it was read
                sqlx::query(
                    r#"
                    INSERT INTO store (id, code, name, address, opened, province, city, district,
                                       road_address, lot_address, latitude, longitude)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON DUPLICATE KEY UPDATE
                        code = VALUES(code), name = VALUES(name), address = VALUES(address),
                        opened = VALUES(opened), province = VALUES(province), city = VALUES(city),
                        district = VALUES(district), road_address = VALUES(road_address),
                        lot_address = VALUES(lot_address), latitude = VALUES(latitude),
                        longitude = VALUES(longitude)
                    "#,
                )
                .bind(id)
                .bind(&store.code)
                .bind(&store.name)
                .bind(&store.address)
                .bind(store.opened)
                .bind(&store.province)
                .bind(&store.city)
                .bind(&store.district)
                .bind(&store.road_address)
                .bind(&store.lot_address)
                .bind(store.latitude)
                .bind(store.longitude)
                .execute(&self.pool)
                .await?;

                id
            }
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to save store {}", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, code, name, address, opened, province, city, district,
                   road_address, lot_address, latitude, longitude
            FROM store
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    async fn find_all(&self) -> Result<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, code, name, address, opened, province, city, district,
                   road_address, lot_address, latitude, longitude
            FROM store
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM store WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
