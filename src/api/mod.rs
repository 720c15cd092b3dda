pub mod auth;
pub mod error;
mod sponsors;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Request body ceiling for the public submission form: two uploads at the
/// 4 MiB per-file limit plus text fields and multipart framing. The per-file
/// limit itself is enforced in the handler.
const MAX_SUBMISSION_BODY: usize = 10 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public submission endpoint
    let public_routes = Router::new()
        .route("/sponsorship", post(sponsors::submit_sponsorship))
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BODY));

    // Admin area; every sponsor handler takes the AdminSession extractor,
    // so the auth gate lives on the handlers rather than a middleware layer
    let admin_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/change-password", post(auth::change_password))
        .route(
            "/sponsors",
            get(sponsors::list_sponsors).post(sponsors::create_sponsor),
        )
        .route(
            "/sponsors/:id",
            get(sponsors::get_sponsor).post(sponsors::update_sponsor),
        )
        .route("/sponsors/:id/delete", post(sponsors::archive_sponsor));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public_routes)
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::test_pool;
    use crate::{AppState, DbPool};

    async fn test_app() -> (Router, DbPool) {
        let pool = test_pool().await;
        let state = AppState::new(Config::default(), pool.clone()).await;
        (create_router(Arc::new(state)), pool)
    }

    const BOUNDARY: &str = "sponsorform";

    fn text_part(body: &mut Vec<u8>, name: &str, value: &str) {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    fn file_part(
        body: &mut Vec<u8>,
        name: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    fn close(mut body: Vec<u8>) -> Vec<u8> {
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn submission_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sponsorship")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn contact_fields(body: &mut Vec<u8>) {
        text_part(body, "name", "Smith Co.");
        text_part(body, "contactName", "Jane Doe");
        text_part(body, "email", "jane@example.com");
        text_part(body, "contactNumber", "0412 345 678");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _pool) = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_submission_near_file_size_ceiling_reaches_the_handler() {
        // A valid submission carrying a 3 MiB file must get through the
        // request body limit and fail only at the unconfigured asset store,
        // proving the handler's own size checks govern rather than the
        // framework default.
        let (app, _pool) = test_app().await;

        let mut body = Vec::new();
        contact_fields(&mut body);
        text_part(&mut body, "tierId", "gold");
        let large = vec![0u8; 3 * 1024 * 1024];
        file_part(&mut body, "socialsImage", "logo.png", "image/png", &large);
        file_part(&mut body, "printImage", "logo-print.png", "image/png", &[1u8; 64]);

        let response = app.oneshot(submission_request(close(body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_custom_tier_without_note_writes_no_row() {
        let (app, pool) = test_app().await;

        let mut body = Vec::new();
        contact_fields(&mut body);
        text_part(&mut body, "tierId", "custom");
        text_part(&mut body, "customAmount", "750");
        text_part(&mut body, "emailSeparately", "on");

        let response = app.oneshot(submission_request(close(body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"]["field_errors"]["customAmountNote"].is_array());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sponsors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_oversized_file_is_a_field_error_not_a_transport_error() {
        let (app, pool) = test_app().await;

        let mut body = Vec::new();
        contact_fields(&mut body);
        text_part(&mut body, "tierId", "gold");
        let oversized = vec![0u8; 4 * 1024 * 1024 + 1];
        file_part(&mut body, "socialsImage", "logo.png", "image/png", &oversized);
        file_part(&mut body, "printImage", "logo-print.png", "image/png", &[1u8; 64]);

        let response = app.oneshot(submission_request(close(body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"]["field_errors"]["socialsImage"].is_array());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sponsors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_admin_routes_redirect_without_a_session() {
        let (app, _pool) = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/sponsors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/admin/login"
        );
    }
}
