use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::tracking::{TrackingView, WebSocketTransport};

use super::api::tracking as tracking_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;

/// Everything a handler needs, handed in explicitly through axum state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub view: Arc<Mutex<TrackingView<WebSocketTransport>>>,
}

pub fn build_state(config: Config) -> AppState {
    let transport = Arc::new(WebSocketTransport::new(
        config.stream.base_url.clone(),
        config.stream.token.clone(),
    ));
    let stale_after = chrono::Duration::from_std(config.stream.stale_after)
        .unwrap_or_else(|_| chrono::Duration::seconds(30));
    let view = TrackingView::new(transport, config.stream.reconnect.clone())
        .with_stale_after(stale_after);

    AppState {
        config: Arc::new(config),
        view: Arc::new(Mutex::new(view)),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/tracking/watch", post(tracking_handlers::watch))
        .route("/api/tracking/unwatch", post(tracking_handlers::unwatch))
        .route("/api/tracking/status", get(tracking_handlers::status))
        .route(
            "/api/tracking/status/update",
            get(tracking_handlers::status_update),
        )
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let app = build_router(build_state(config));

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
stream:
  base_url: ws://127.0.0.1:9
  reconnect:
    initial_delay: 1s
    max_attempts: 1
api_keys:
  - key: full
    name: dashboard
    permissions: [watch, view_status]
  - key: readonly
    name: wallboard
    permissions: [view_status]
"#;

    fn app() -> Router {
        build_router(build_state(Config::from_str(CONFIG).unwrap()))
    }

    fn request(method: &str, uri: &str, key: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rejects_missing_and_unknown_keys() {
        let app = app();

        let response = app
            .clone()
            .oneshot(request("GET", "/api/tracking/status", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(request("GET", "/api/tracking/status", Some("bogus"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_non_bearer_authorization() {
        let request = Request::builder()
            .uri("/api/tracking/status")
            .header("Authorization", "Basic cmVhZG9ubHk=")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "Invalid Authorization format");
    }

    #[tokio::test]
    async fn read_only_key_cannot_watch() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/tracking/watch",
                Some("readonly"),
                Some(serde_json::json!({ "booking_id": "B1" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn refuses_bookings_without_active_delivery() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/tracking/watch",
                Some("full"),
                Some(serde_json::json!({ "booking_id": "B1", "status": "delivered" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json(response).await["error"], "booking_not_trackable");
    }

    #[tokio::test]
    async fn rejects_invalid_booking_id() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/tracking/watch",
                Some("full"),
                Some(serde_json::json!({ "booking_id": "../B1" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn watch_status_unwatch() {
        let app = app();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/tracking/watch",
                Some("full"),
                Some(serde_json::json!({ "booking_id": "B1", "status": "in_transit" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["booking_id"], "B1");
        assert_eq!(body["connected"], false);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/tracking/status", Some("readonly"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["booking_id"], "B1");

        let response = app
            .clone()
            .oneshot(request("GET", "/api/tracking/status/update", Some("readonly"), None))
            .await
            .unwrap();
        assert_eq!(json(response).await, Value::Null);

        let response = app
            .oneshot(request("POST", "/api/tracking/unwatch", Some("full"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["booking_id"], Value::Null);
    }
}
