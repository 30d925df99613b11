use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use shared::{
    BudgetData, BudgetSummary, Category, CreateItemRequest, CreateItemResponse,
    DeleteItemResponse, HealthResponse, Month, MonthAmounts, UpdateAmountRequest,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::db::now_rfc3339;
use crate::domain::BudgetService;
use crate::error::BudgetError;

/// Owner recorded on every row until real account handling exists.
pub const DEFAULT_OWNER_ID: i64 = 1;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub budget_service: BudgetService,
}

impl AppState {
    pub fn new(budget_service: BudgetService) -> Self {
        Self { budget_service }
    }
}

/// Create the Axum router with all routes configured.
pub fn create_router(state: AppState, cors_origin: HeaderValue) -> Router {
    // CORS setup to allow the browser frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/budget", get(get_budget))
        .route("/budget/summary", get(get_summary))
        .route("/budget/items", post(create_item))
        .route("/budget/items/:category/:item_name", delete(delete_item))
        .route("/budget/:category/:item_name/:month", put(update_amount))
        .route("/health", get(health));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Axum handler for GET /api/budget
pub async fn get_budget(
    State(state): State<AppState>,
) -> Result<Json<BudgetData>, BudgetError> {
    info!("GET /api/budget");

    let data = state.budget_service.budget(DEFAULT_OWNER_ID).await?;
    Ok(Json(data))
}

/// Axum handler for PUT /api/budget/:category/:item_name/:month
pub async fn update_amount(
    State(state): State<AppState>,
    Path((category, item_name, month)): Path<(String, String, String)>,
    body: Result<Json<UpdateAmountRequest>, JsonRejection>,
) -> Result<Json<MonthAmounts>, BudgetError> {
    info!("PUT /api/budget/{}/{}/{}", category, item_name, month);

    let category = parse_category(&category)?;
    let month = parse_month(&month)?;
    let Json(patch) = body.map_err(|rejection| BudgetError::Validation(rejection.body_text()))?;

    let amounts = state
        .budget_service
        .update_amount(DEFAULT_OWNER_ID, category, &item_name, month, patch)
        .await?;
    Ok(Json(amounts))
}

/// Axum handler for POST /api/budget/items
pub async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateItemResponse>), BudgetError> {
    let Json(request) = body.map_err(|rejection| BudgetError::Validation(rejection.body_text()))?;
    info!("POST /api/budget/items - {} / {}", request.category, request.item_name);

    let created = state
        .budget_service
        .create_item(DEFAULT_OWNER_ID, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Axum handler for DELETE /api/budget/items/:category/:item_name
pub async fn delete_item(
    State(state): State<AppState>,
    Path((category, item_name)): Path<(String, String)>,
) -> Result<Json<DeleteItemResponse>, BudgetError> {
    info!("DELETE /api/budget/items/{}/{}", category, item_name);

    let category = parse_category(&category)?;
    let deleted = state
        .budget_service
        .delete_item(DEFAULT_OWNER_ID, category, &item_name)
        .await?;
    Ok(Json(deleted))
}

/// Axum handler for GET /api/budget/summary
pub async fn get_summary(
    State(state): State<AppState>,
) -> Result<Json<BudgetSummary>, BudgetError> {
    info!("GET /api/budget/summary");

    let summary = state.budget_service.summary(DEFAULT_OWNER_ID).await?;
    Ok(Json(summary))
}

/// Axum handler for GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now_rfc3339(),
    })
}

/// Path segments arrive as plain strings; a bad category or month is a
/// validation error with the usual `{"error": ...}` body.
fn parse_category(segment: &str) -> Result<Category, BudgetError> {
    segment
        .parse()
        .map_err(|e: shared::ParseCategoryError| BudgetError::Validation(e.to_string()))
}

fn parse_month(segment: &str) -> Result<Month, BudgetError> {
    segment
        .parse()
        .map_err(|e: shared::ParseMonthError| BudgetError::Validation(e.to_string()))
}
