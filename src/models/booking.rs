use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, AsRefStr, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    Requested,
    Accepted,
    PickedUp,
    InTransit,
    Delivered,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "Requested",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::PickedUp => "Picked Up",
            BookingStatus::InTransit => "In Transit",
            BookingStatus::Delivered => "Delivered",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// A runner is assigned and the live position feed is meaningful.
    pub fn can_track(&self) -> bool {
        matches!(
            self,
            BookingStatus::Accepted | BookingStatus::PickedUp | BookingStatus::InTransit
        )
    }

    pub fn can_pay(&self) -> bool {
        matches!(self, BookingStatus::Requested)
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self, BookingStatus::Delivered)
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self, BookingStatus::Requested | BookingStatus::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PetSpec {
    pub pet_type: String,
    pub name: String,
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_needs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Booking {
    pub id: String,
    pub booking_number: String,
    pub owner_id: String,
    #[serde(default)]
    pub runner_id: Option<String>,
    pub status: BookingStatus,
    pub pet_spec: PetSpec,
    pub pickup_address: Address,
    pub dropoff_address: Address,
    pub estimated_price_cents: i64,
    #[serde(default)]
    pub final_price_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub picked_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Final price once settled, otherwise the estimate.
    pub fn price_cents(&self) -> i64 {
        self.final_price_cents.unwrap_or(self.estimated_price_cents)
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(super::DEFAULT_CURRENCY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct CreateBookingRequest {
    pub pet_spec: PetSpec,
    pub pickup_address: Address,
    pub dropoff_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, utoipa::ToSchema)]
pub struct CancelBookingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
