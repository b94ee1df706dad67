use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, AsRefStr, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PetShopCategory {
    Grooming,
    Vet,
    Boarding,
    PetStore,
}

impl PetShopCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PetShopCategory::Grooming => "Grooming",
            PetShopCategory::Vet => "Veterinary",
            PetShopCategory::Boarding => "Boarding",
            PetShopCategory::PetStore => "Pet Store",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PetShop {
    pub id: String,
    pub name: String,
    pub category: PetShopCategory,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub services: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PetShop {
    pub fn services(&self) -> &[String] {
        self.services.as_deref().unwrap_or_default()
    }
}
