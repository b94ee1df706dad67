use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::BookingStatus;
use crate::tracking::{self, TrackingStatus, TrackingUpdate};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::server::AppState;
use crate::web::config::Permission;

#[derive(Debug, Deserialize, ToSchema)]
pub struct WatchRequest {
    pub booking_id: String,
    /// Booking status as last seen by the caller. When given, bookings
    /// without an active delivery are refused.
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

#[utoipa::path(
    post,
    path = "/api/tracking/watch",
    request_body = WatchRequest,
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Tracking started", body = TrackingStatus),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Booking has no delivery in progress", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn watch(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<WatchRequest>,
) -> ApiResult<Json<TrackingStatus>> {
    require_permission(&user, Permission::Watch)?;

    tracking::validate_booking_id(&request.booking_id)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if let Some(status) = request.status {
        if !status.can_track() {
            return Err(ApiError::Conflict("booking_not_trackable"));
        }
    }

    log::info!("{} started tracking booking {}", user.name, request.booking_id);

    let mut view = state.view.lock().await;
    view.watch(request.booking_id);
    Ok(Json(view.status()))
}

#[utoipa::path(
    post,
    path = "/api/tracking/unwatch",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Tracking stopped", body = TrackingStatus),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn unwatch(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TrackingStatus>> {
    require_permission(&user, Permission::Watch)?;
    let mut view = state.view.lock().await;
    view.unwatch();
    Ok(Json(view.status()))
}

#[utoipa::path(
    get,
    path = "/api/tracking/status",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Tracking status", body = TrackingStatus),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TrackingStatus>> {
    require_permission(&user, Permission::ViewStatus)?;
    let view = state.view.lock().await;
    Ok(Json(view.status()))
}

#[utoipa::path(
    get,
    path = "/api/tracking/status/update",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Last known position", body = Option<TrackingUpdate>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn status_update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Option<TrackingUpdate>>> {
    require_permission(&user, Permission::ViewStatus)?;
    let view = state.view.lock().await;
    Ok(Json(view.status().last_update))
}
