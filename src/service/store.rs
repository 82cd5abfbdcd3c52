//! Store business logic

use crate::domain::{haversine_km, NearbyQuery, StoreRequest, StoreResponse};
use crate::error::{AppError, Result};
use crate::repository::StoreRepository;
use std::sync::Arc;
use tracing::debug;

pub struct StoreService<R: StoreRepository> {
    repo: Arc<R>,
}

fn record_operation(operation: &'static str) {
    metrics::counter!("catcheat_store_operations_total", "operation" => operation).increment(1);
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Store not found: {}", id))
}

impl<R: StoreRepository> StoreService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: StoreRequest) -> Result<StoreResponse> {
        let saved = self.repo.save(&request.into_entity()).await?;
        record_operation("create");
        debug!(store_id = ?saved.id, code = %saved.code, "Store created");
        StoreResponse::try_from(saved)
    }

    pub async fn get(&self, id: i64) -> Result<StoreResponse> {
        let store = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        record_operation("get");
        StoreResponse::try_from(store)
    }

    pub async fn get_all(&self) -> Result<Vec<StoreResponse>> {
        let stores = self.repo.find_all().await?;
        record_operation("list");
        stores.into_iter().map(StoreResponse::try_from).collect()
    }

    pub async fn update(&self, id: i64, request: StoreRequest) -> Result<StoreResponse> {
        let mut store = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        request.apply_to(&mut store);
        let saved = self.repo.save(&store).await?;
        record_operation("update");
        debug!(store_id = id, "Store updated");
        StoreResponse::try_from(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repo.delete_by_id(id).await?;
        record_operation("delete");
        debug!(store_id = id, "Store deleted");
        Ok(())
    }

    /// Stores within `radius_km` of the query point, nearest first
    pub async fn find_nearby(&self, query: NearbyQuery) -> Result<Vec<StoreResponse>> {
        query.check().map_err(AppError::BadRequest)?;

        let origin = (query.lat, query.lng);
        let mut hits: Vec<_> = self
            .repo
            .find_all()
            .await?
            .into_iter()
            .filter_map(|store| {
                let distance = haversine_km(origin, store.coordinates()?);
                (distance <= query.radius_km).then_some((distance, store))
            })
            .collect();

        hits.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(query.limit);
        record_operation("nearby");

        hits.into_iter()
            .map(|(distance, store)| StoreResponse::with_distance(store, distance))
            .collect()
    }
}
