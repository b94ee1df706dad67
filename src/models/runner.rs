use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Runner {
    pub id: String,
    pub full_name: String,
    pub vehicle_type: String,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_plate: Option<String>,
    pub rating: f64,
    pub total_trips: u32,
    #[serde(default)]
    pub air_conditioned: bool,
    /// Only present on proximity searches.
    #[serde(default)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct NearbyRunnersQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl NearbyRunnersQuery {
    pub const DEFAULT_RADIUS_KM: f64 = 10.0;

    pub fn around(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km: Self::DEFAULT_RADIUS_KM,
        }
    }
}
