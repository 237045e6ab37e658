//! REST API server for the advisor engine
//!
//! Thin HTTP layer over `AdvisorContext`. Every response is wrapped in
//! `ApiResponse`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::context::AdvisorContext;
use crate::error::AdvisorError;
use crate::models::{TaxpayerProfile, UserProfile, WealthPlanInput};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WealthRequest {
    #[serde(flatten)]
    pub plan: WealthPlanInput,
    /// Overrides the configured recommendation count
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub context: Arc<AdvisorContext>,
}

/// =============================
/// Error Mapping
/// =============================

fn status_for(error: &AdvisorError) -> StatusCode {
    match error {
        AdvisorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisorError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(
    request_id: uuid::Uuid,
    endpoint: &'static str,
    result: crate::Result<T>,
) -> (StatusCode, Json<ApiResponse>) {
    match result {
        Ok(data) => {
            info!(%request_id, endpoint, "Request completed");
            (StatusCode::OK, Json(ApiResponse::success(data)))
        }
        Err(e) => {
            let status = status_for(&e);
            if e.is_client_error() {
                info!(%request_id, endpoint, error = %e, "Request rejected");
            } else {
                warn!(%request_id, endpoint, error = %e, "Request failed");
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Body that failed to parse, wrapped like every other error
fn reject(
    request_id: uuid::Uuid,
    endpoint: &'static str,
    rejection: JsonRejection,
) -> (StatusCode, Json<ApiResponse>) {
    let message = rejection.body_text();
    info!(%request_id, endpoint, error = %message, "Request body rejected");
    (rejection.status(), Json(ApiResponse::error(message)))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "rules_loaded": state.context.rules().map_or(0, |r| r.len()),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Component Endpoints
/// =============================

async fn schemes_eligibility(
    State(state): State<ApiState>,
    payload: Result<Json<UserProfile>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let request_id = uuid::Uuid::new_v4();
    let Json(profile) = match payload {
        Ok(body) => body,
        Err(rejection) => return reject(request_id, "schemes_eligibility", rejection),
    };
    info!(%request_id, age = profile.age, state = %profile.state, "Eligibility request");

    respond(
        request_id,
        "schemes_eligibility",
        state.context.eligible_schemes(&profile),
    )
}

async fn tax_compare(
    State(state): State<ApiState>,
    payload: Result<Json<TaxpayerProfile>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let request_id = uuid::Uuid::new_v4();
    let Json(profile) = match payload {
        Ok(body) => body,
        Err(rejection) => return reject(request_id, "tax_compare", rejection),
    };
    info!(%request_id, is_salaried = profile.is_salaried, "Tax comparison request");

    respond(request_id, "tax_compare", state.context.compare_tax(&profile))
}

async fn wealth_project(
    State(state): State<ApiState>,
    payload: Result<Json<WealthRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let request_id = uuid::Uuid::new_v4();
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return reject(request_id, "wealth_project", rejection),
    };
    info!(
        %request_id,
        user_age = req.plan.user_age,
        retirement_age = req.plan.retirement_age,
        "Wealth projection request"
    );

    respond(
        request_id,
        "wealth_project",
        state.context.project_wealth(&req.plan, req.top_n),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(context: Arc<AdvisorContext>) -> Router {
    let state = ApiState { context };

    Router::new()
        .route("/health", get(health))
        .route("/api/schemes/eligibility", post(schemes_eligibility))
        .route("/api/tax/compare", post(tax_compare))
        .route("/api/wealth/project", post(wealth_project))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    context: Arc<AdvisorContext>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(context);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdvisorConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        let context = AdvisorContext::from_config(&AdvisorConfig::default()).unwrap();
        create_router(Arc::new(context))
    }

    async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> (StatusCode, ApiResponse) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["rules_loaded"], 12);
    }

    #[tokio::test]
    async fn test_tax_compare() {
        let (status, body) = post_json(
            router(),
            "/api/tax/compare",
            serde_json::json!({"age": 30, "annual_income": 800000.0, "is_salaried": true}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        let data = body.data.unwrap();
        assert_eq!(data["tax_old"], 65000.0);
        assert_eq!(data["tax_new"], 0.0);
        assert_eq!(data["recommended_regime"], "New Regime");
        assert_eq!(data["ml_recommendation"], "New Regime");
    }

    #[tokio::test]
    async fn test_tax_validation_is_422() {
        let (status, body) = post_json(
            router(),
            "/api/tax/compare",
            serde_json::json!({"age": 30, "annual_income": -5.0, "is_salaried": false}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
        assert!(body.error.unwrap().contains("annual_income"));
    }

    #[tokio::test]
    async fn test_eligibility() {
        let (status, body) = post_json(
            router(),
            "/api/schemes/eligibility",
            serde_json::json!({
                "age": 45,
                "annual_income": 150000,
                "state": "Andhra Pradesh",
                "gender": "Male",
                "caste": "OBC",
                "employment_type": "Farmer",
                "disability_status": "No",
                "education_level": "Secondary"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        let count = data["count"].as_u64().unwrap();
        assert_eq!(count as usize, data["eligible_schemes"].as_array().unwrap().len());
        assert!(count > 0);
    }

    #[tokio::test]
    async fn test_eligibility_without_rules_is_503() {
        let router = create_router(Arc::new(AdvisorContext::new()));
        let (status, body) = post_json(
            router,
            "/api/schemes/eligibility",
            serde_json::json!({
                "age": 25,
                "annual_income": 200000,
                "state": "Any",
                "gender": "Female",
                "caste": "General",
                "employment_type": "Student",
                "disability_status": "No",
                "education_level": "Graduate"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_wealth_project_with_top_n() {
        let (status, body) = post_json(
            router(),
            "/api/wealth/project",
            serde_json::json!({
                "user_age": 30,
                "retirement_age": 32,
                "current_savings": 0.0,
                "monthly_investment": 1000.0,
                "expected_return": 10.0,
                "risk_tolerance": "Moderate",
                "liquidity": "Low",
                "top_n": 3
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["corpus"], 25200.0);
        assert_eq!(data["rows"].as_array().unwrap().len(), 2);
        assert_eq!(data["recommendations"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_wrapped() {
        let (status, body) = post_json(
            router(),
            "/api/schemes/eligibility",
            serde_json::json!({
                "age": -3,
                "annual_income": 200000,
                "state": "Any",
                "gender": "Female",
                "caste": "General",
                "employment_type": "Student",
                "disability_status": "No",
                "education_level": "Graduate"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
        assert!(body.data.is_none());
        assert!(body.error.unwrap().contains("age"));

        let (status, body) = post_json(
            router(),
            "/api/tax/compare",
            serde_json::json!({"age": 30, "is_salaried": true}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.unwrap().contains("annual_income"));
    }

    #[tokio::test]
    async fn test_unbounded_horizon_is_422() {
        let (status, body) = post_json(
            router(),
            "/api/wealth/project",
            serde_json::json!({
                "user_age": 0,
                "retirement_age": 4294967295u64,
                "current_savings": 0.0,
                "monthly_investment": 1000.0,
                "expected_return": 10.0,
                "risk_tolerance": "Moderate",
                "liquidity": "Low"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.unwrap().contains("retirement_age"));
    }
}
