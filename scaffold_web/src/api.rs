//! HTTP routes.
//!
//! Calculator endpoints reply with the engine's records or a structured
//! error; waitlist endpoints reply with a `{success, message, data}`
//! envelope the signup form consumes directly.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use scaffold_core::calculations::{calculate, CalculationInput, SizingOptions};
use scaffold_core::catalog::ComponentCatalog;
use scaffold_core::errors::CalcError;
use scaffold_core::pdf::render_calculation_pdf;
use scaffold_core::waitlist::WaitlistStore;

/// Shared, read-mostly service state
pub struct AppState {
    pub catalog: Arc<ComponentCatalog>,
    pub waitlist: Arc<dyn WaitlistStore>,
    pub sizing: SizingOptions,
}

pub type SharedState = Arc<AppState>;

/// Build the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/calculate", post(calculate_handler))
        .route("/api/report", post(report_handler))
        .route("/api/waitlist", post(join_waitlist).get(list_waitlist))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "scaffold_web",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn catalog_handler(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "schema_version": state.catalog.schema_version,
        "frames": state.catalog.frames(),
        "platforms": state.catalog.platforms(),
        "systems": state.catalog.systems(),
    }))
}

/// Calculator request: a `CalculationInput` plus optional `options` and
/// `label` keys at the top level.
struct CalculateRequest {
    input: CalculationInput,
    options: Option<SizingOptions>,
    label: String,
}

impl CalculateRequest {
    fn parse(body: Result<Json<Value>, JsonRejection>) -> Result<Self, ApiError> {
        let Json(mut body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let fields = body
            .as_object_mut()
            .ok_or_else(|| ApiError::BadRequest("request body must be a JSON object".to_string()))?;

        let options = fields
            .remove("options")
            .filter(|v| !v.is_null())
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ApiError::BadRequest(format!("options: {}", e)))?;
        let label = match fields.remove("label") {
            Some(Value::String(label)) => label,
            _ => String::new(),
        };
        let input = serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(CalculateRequest {
            input,
            options,
            label,
        })
    }
}

async fn calculate_handler(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = CalculateRequest::parse(body)?;
    let options = request.options.unwrap_or(state.sizing);

    let result = calculate(&request.input, &state.catalog, &options)?;
    tracing::info!(
        mode = request.input.mode(),
        total_components = result.total_components,
        weight_kg = result.weight_kg,
        "calculated"
    );
    Ok(Json(serde_json::to_value(&result).map_err(CalcError::from)?))
}

async fn report_handler(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = CalculateRequest::parse(body)?;
    let options = request.options.unwrap_or(state.sizing);
    let catalog = Arc::clone(&state.catalog);

    let pdf = tokio::task::spawn_blocking(move || {
        let result = calculate(&request.input, &catalog, &options)?;
        render_calculation_pdf(&request.input, &options, &result, &request.label)
    })
    .await
    .map_err(|e| CalcError::internal(format!("report worker failed: {}", e)))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"scaffold-materials.pdf\"",
            ),
        ],
        pdf,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct WaitlistRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct WaitlistReply<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn waitlist_failure(status: StatusCode, message: impl Into<String>) -> Response {
    let reply: WaitlistReply<()> = WaitlistReply {
        success: false,
        message: Some(message.into()),
        data: None,
    };
    (status, Json(reply)).into_response()
}

/// Form-facing text for a rejected signup
fn signup_message(error: &CalcError) -> String {
    match error {
        CalcError::ValidationError { reason, .. } => reason.clone(),
        CalcError::MissingField { .. } => "Email is required".to_string(),
        CalcError::DuplicateEntry { .. } => "This email is already on the waitlist".to_string(),
        other => other.to_string(),
    }
}

async fn join_waitlist(
    State(state): State<SharedState>,
    body: Result<Json<WaitlistRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected waitlist body");
            return waitlist_failure(StatusCode::BAD_REQUEST, "Please enter a valid email address");
        }
    };

    let store = Arc::clone(&state.waitlist);
    let outcome = tokio::task::spawn_blocking(move || store.add(&request.email)).await;

    match outcome {
        Ok(Ok(entry)) => {
            let reply = WaitlistReply {
                success: true,
                message: Some("Successfully added to waitlist".to_string()),
                data: Some(json!({ "email": entry.email })),
            };
            (StatusCode::CREATED, Json(reply)).into_response()
        }
        Ok(Err(e)) if e.is_client_error() => {
            tracing::debug!(code = e.error_code(), "waitlist signup rejected");
            waitlist_failure(StatusCode::BAD_REQUEST, signup_message(&e))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "error adding to waitlist");
            waitlist_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to add to waitlist. Please try again.",
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "waitlist worker failed");
            waitlist_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to add to waitlist. Please try again.",
            )
        }
    }
}

async fn list_waitlist(State(state): State<SharedState>) -> Response {
    let store = Arc::clone(&state.waitlist);
    match tokio::task::spawn_blocking(move || store.entries()).await {
        Ok(Ok(entries)) => {
            let reply = WaitlistReply {
                success: true,
                message: None,
                data: Some(entries),
            };
            (StatusCode::OK, Json(reply)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "error retrieving waitlist");
            waitlist_failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve waitlist")
        }
        Err(e) => {
            tracing::error!(error = %e, "waitlist worker failed");
            waitlist_failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve waitlist")
        }
    }
}

/// API Errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Calc(e) => {
                let status = if e.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    tracing::error!(error = %e, "request failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    json!({
                        "error": e.error_code(),
                        "message": e.to_string(),
                        "details": e,
                    }),
                )
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "INVALID_REQUEST",
                    "message": msg,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use scaffold_core::waitlist::MemoryWaitlist;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState {
            catalog: Arc::new(ComponentCatalog::builtin().unwrap().clone()),
            waitlist: Arc::new(MemoryWaitlist::new()),
            sizing: SizingOptions::default(),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn reference_request() -> Value {
        json!({
            "mode": "dimensions",
            "sides": [{ "width_m": 10.0, "height_m": 3.0 }],
            "frame_size": "mason-frame-152x152",
            "platform_length": "platform-244",
            "work_levels": 2,
            "building_sides": 1
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_catalog_listing() {
        let (status, body) = send(&app(), get("/api/catalog")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["frames"].as_array().unwrap().len(), 8);
        assert_eq!(body["platforms"].as_array().unwrap().len(), 4);
        assert_eq!(body["systems"][0]["key"], "mason-frame");
    }

    #[tokio::test]
    async fn test_calculate_reference() {
        let (status, body) = send(&app(), post_json("/api/calculate", reference_request())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["frames"]["quantity"], 16);
        assert_eq!(body["platforms"]["quantity"], 42);
        assert_eq!(body["total_components"], 176);
        assert_eq!(body["weight_kg"], 1531);
        assert_eq!(body["dimensions"], "10.0m x 1.5m x 3.0m");
    }

    #[tokio::test]
    async fn test_calculate_area_with_options() {
        let request = json!({
            "mode": "area",
            "area_m2": 30,
            "height_m": 3,
            "frame_size": "mason-frame-152x152",
            "platform_length": "platform-244",
            "work_levels": 2,
            "building_sides": 1,
            "options": { "top_level_only": true }
        });
        let (status, body) = send(&app(), post_json("/api/calculate", request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["guardrails"]["quantity"], 12);
        assert_eq!(body["frames"]["quantity"], 16);
    }

    #[tokio::test]
    async fn test_calculate_unknown_frame() {
        let mut request = reference_request();
        request["frame_size"] = json!("mason-frame-999x999");
        let (status, body) = send(&app(), post_json("/api/calculate", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "UNKNOWN_CATALOG_KEY");
        assert_eq!(body["details"]["type"], "UnknownCatalogKey");
    }

    #[tokio::test]
    async fn test_calculate_validation_error() {
        let mut request = reference_request();
        request["sides"] = json!([{ "width_m": -5.0, "height_m": 3.0 }]);
        let (status, body) = send(&app(), post_json("/api/calculate", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_calculate_malformed_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_REQUEST");

        let (status, _) = send(&app(), post_json("/api/calculate", json!({ "mode": "volume" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_is_pdf() {
        let mut request = reference_request();
        request["label"] = json!("Test site");
        let response = app()
            .oneshot(post_json("/api/report", request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_waitlist_signup_flow() {
        let app = app();

        let (status, body) =
            send(&app, post_json("/api/waitlist", json!({ "email": "New@Example.com" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Successfully added to waitlist");
        assert_eq!(body["data"]["email"], "new@example.com");

        let (status, body) =
            send(&app, post_json("/api/waitlist", json!({ "email": "new@example.com" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, get("/api/waitlist")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["email"], "new@example.com");
    }

    #[tokio::test]
    async fn test_waitlist_invalid_email() {
        let app = app();
        let (status, body) =
            send(&app, post_json("/api/waitlist", json!({ "email": "not-an-email" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Please enter a valid email address");

        let (status, body) = send(&app, post_json("/api/waitlist", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, body) = send(&app, get("/api/waitlist")).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    struct BrokenStore;

    impl WaitlistStore for BrokenStore {
        fn add(&self, _email: &str) -> scaffold_core::errors::CalcResult<scaffold_core::WaitlistEntry> {
            Err(CalcError::file_error("write", "waitlist.json", "disk full"))
        }

        fn entries(&self) -> scaffold_core::errors::CalcResult<Vec<scaffold_core::WaitlistEntry>> {
            Err(CalcError::file_error("read", "waitlist.json", "permission denied"))
        }
    }

    #[tokio::test]
    async fn test_waitlist_storage_failure() {
        let app = create_router(AppState {
            catalog: Arc::new(ComponentCatalog::builtin().unwrap().clone()),
            waitlist: Arc::new(BrokenStore),
            sizing: SizingOptions::default(),
        });

        let (status, body) =
            send(&app, post_json("/api/waitlist", json!({ "email": "ok@example.com" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to add to waitlist. Please try again.");

        let (status, body) = send(&app, get("/api/waitlist")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to retrieve waitlist");
    }
}
