use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use shared::*;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub engine: ReservationEngine,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/product",
            get(list_products).post(add_product).delete(delete_products),
        )
        .route(
            "/product/warehouse",
            axum::routing::post(reserve_products).delete(release_products),
        )
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn error_response(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is_client_error() {
        tracing::warn!("Rejected request: {}", err.detail());
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Request failed: {}", err.detail());
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: err.public_message(),
        }),
    )
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<AvailableProducts> {
    state
        .engine
        .list_available()
        .await
        .map(Json)
        .map_err(error_response)
}

// Bodies are decoded by hand so a missing or wrong Content-Type still gets
// the domain error message rather than axum's extractor rejection.
pub async fn add_product(State(state): State<AppState>, body: Bytes) -> ApiResult<Product> {
    let product = parse_new_product(&body).map_err(error_response)?;

    state
        .engine
        .add_product(product)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_products(State(state): State<AppState>, body: Bytes) -> ApiResult<Vec<Product>> {
    let ids = parse_batch(&body).map_err(error_response)?;

    state
        .engine
        .delete_products(&ids)
        .await
        .and_then(BatchReport::into_result)
        .map(Json)
        .map_err(error_response)
}

pub async fn reserve_products(State(state): State<AppState>, body: Bytes) -> ApiResult<Vec<Product>> {
    let ids = parse_batch(&body).map_err(error_response)?;

    state
        .engine
        .reserve(&ids)
        .await
        .and_then(BatchReport::into_result)
        .map(Json)
        .map_err(error_response)
}

pub async fn release_products(State(state): State<AppState>, body: Bytes) -> ApiResult<Vec<Product>> {
    let ids = parse_batch(&body).map_err(error_response)?;

    state
        .engine
        .release(&ids)
        .await
        .and_then(BatchReport::into_result)
        .map(Json)
        .map_err(error_response)
}

pub async fn health_check() -> &'static str {
    "OK"
}
