use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Escrow lifecycle marker, owned by the payment service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, AsRefStr, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EscrowStatus {
    Pending,
    Held,
    Released,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub runner_id: Option<String>,
    pub escrow_status: EscrowStatus,
    pub amount_cents: i64,
    pub platform_fee_cents: i64,
    pub runner_payout_cents: i64,
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub stripe_payment_id: Option<String>,
    #[serde(default)]
    pub escrow_held_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub escrow_released_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refunded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refund_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        matches!(
            self.escrow_status,
            EscrowStatus::Held | EscrowStatus::Released
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct InitiatePaymentRequest {
    pub booking_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: String,
}

impl InitiatePaymentRequest {
    pub fn for_booking(booking: &super::Booking, customer_email: impl Into<String>) -> Self {
        Self {
            booking_id: booking.id.clone(),
            amount_cents: booking.estimated_price_cents,
            currency: booking.currency().to_string(),
            customer_email: customer_email.into(),
        }
    }
}
