//! Payload shapes of the marketplace REST API.
//!
//! Required fields are required: a payload missing one fails to decode with a
//! [`DecodeError`] instead of producing a half-filled record.

mod booking;
mod payment;
mod petshop;
mod runner;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use booking::{Address, Booking, BookingStatus, CancelBookingRequest, CreateBookingRequest, PetSpec};
pub use payment::{EscrowStatus, InitiatePaymentRequest, Payment};
pub use petshop::{PetShop, PetShopCategory};
pub use runner::{NearbyRunnersQuery, Runner};

pub const DEFAULT_CURRENCY: &str = "MYR";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Api(String),
    #[error("response carried no data")]
    MissingData,
}

/// Envelope of single-object responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> Result<T, DecodeError> {
        if !self.success || self.error.is_some() {
            return Err(DecodeError::Api(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.data.ok_or(DecodeError::MissingData)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl<T> PaginatedResponse<T> {
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or_else(|| {
            if self.limit == 0 {
                0
            } else {
                self.total.div_ceil(self.limit as u64) as u32
            }
        })
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(body)?)
}

/// Unwrap a single-object response body.
pub fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
    decode::<ApiResponse<T>>(body)?.into_data()
}

/// Format minor units the way prices are shown to customers, e.g. `RM 45.50`.
pub fn format_myr(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}RM {}.{:02}", sign, abs / 100, abs % 100)
}
