use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::error::ErrorResponse;
use super::api::tracking::WatchRequest;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracking::watch,
        super::api::tracking::unwatch,
        super::api::tracking::status,
        super::api::tracking::status_update,
    ),
    components(
        schemas(
            WatchRequest,
            ErrorResponse,
            crate::tracking::TrackingStatus,
            crate::tracking::TrackingUpdate,
            crate::models::BookingStatus,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "PawTrack Live Tracking API",
        description = "Live runner position for bookings with a delivery in progress",
        version = "0.1.0"
    ),
    tags(
        (name = "tracking", description = "Live delivery tracking")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
