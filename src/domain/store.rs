//! Store domain model

use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Mean Earth radius in kilometres (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Default search radius for nearby lookups
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 3.0;

/// Default and maximum result counts for nearby lookups
pub const DEFAULT_NEARBY_LIMIT: usize = 20;
pub const MAX_NEARBY_LIMIT: usize = 100;

/// Store entity (one row of the `store` table)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Store {
    /// `None` until the row has been persisted
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    pub address: String,
    pub opened: bool,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub road_address: Option<String>,
    pub lot_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Store {
    /// Both coordinates, when the store has been geocoded
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Store create/update payload.
///
/// Every field is optional on the wire; a missing field takes its zero value
/// and overwrites the stored one on update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub opened: bool,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub road_address: Option<String>,
    pub lot_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Explicit `null` takes the zero value, same as an omitted field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StoreRequest {
    /// Build a new, unsaved entity
    pub fn into_entity(self) -> Store {
        let mut store = Store::default();
        self.apply_to(&mut store);
        store
    }

    /// Overwrite every mutable field of `store`; the id is left untouched
    pub fn apply_to(self, store: &mut Store) {
        store.code = self.code;
        store.name = self.name;
        store.address = self.address;
        store.opened = self.opened;
        store.province = self.province;
        store.city = self.city;
        store.district = self.district;
        store.road_address = self.road_address;
        store.lot_address = self.lot_address;
        store.latitude = self.latitude;
        store.longitude = self.longitude;
    }
}

/// Store response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub address: String,
    pub opened: bool,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub road_address: Option<String>,
    pub lot_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Kilometres from the search origin; only set by nearby lookups
    pub distance: Option<f64>,
}

impl StoreResponse {
    pub fn with_distance(store: Store, distance_km: f64) -> Result<Self, AppError> {
        Ok(Self {
            distance: Some(distance_km),
            ..Self::try_from(store)?
        })
    }
}

/// Only persisted entities have a response; an unsaved one is an internal error
impl TryFrom<Store> for StoreResponse {
    type Error = AppError;

    fn try_from(store: Store) -> Result<Self, Self::Error> {
        let id = store.id.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Store '{}' has no id; it was never persisted",
                store.code
            ))
        })?;

        Ok(Self {
            id,
            code: store.code,
            name: store.name,
            address: store.address,
            opened: store.opened,
            province: store.province,
            city: store.city,
            district: store.district,
            road_address: store.road_address,
            lot_address: store.lot_address,
            latitude: store.latitude,
            longitude: store.longitude,
            distance: None,
        })
    }
}

/// Nearby search query (`/api/stores/nearby`)
#[derive(Debug, Clone, PartialEq, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_radius_km() -> f64 {
    DEFAULT_NEARBY_RADIUS_KM
}

fn default_limit() -> usize {
    DEFAULT_NEARBY_LIMIT
}

impl NearbyQuery {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            radius_km: DEFAULT_NEARBY_RADIUS_KM,
            limit: DEFAULT_NEARBY_LIMIT,
        }
    }

    /// Check coordinate ranges, radius and limit
    pub fn check(&self) -> std::result::Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("Latitude must be within [-90, 90]: {}", self.lat));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("Longitude must be within [-180, 180]: {}", self.lng));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(format!("radiusKm must be a positive number: {}", self.radius_km));
        }
        if self.limit == 0 || self.limit > MAX_NEARBY_LIMIT {
            return Err(format!(
                "limit must be between 1 and {}: {}",
                MAX_NEARBY_LIMIT, self.limit
            ));
        }
        Ok(())
    }
}

/// Great-circle distance in kilometres (haversine)
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}
