use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    reconcile::{self, RowOutcome, SheetRow},
    state::AppState,
    store::{self, NewProduct, Order, Product},
};

#[derive(Deserialize)]
pub struct RewardsRequest {
    rows: Vec<SheetRow>,
}

#[derive(Serialize)]
pub struct RewardsResponse {
    results: Vec<RowOutcome>,
}

/// `POST /api/ispring-rewards`. Responds 200 with the full outcome list no
/// matter how many individual rows failed; only auth and directory-fetch
/// errors fail the whole request.
pub async fn rewards_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RewardsRequest>, JsonRejection>,
) -> Result<Json<RewardsResponse>, AppError> {
    let Ok(Json(request)) = payload else {
        return Err(AppError::MalformedPayload);
    };

    let results = reconcile::run(&state, request.rows).await?;

    Ok(Json(RewardsResponse { results }))
}

pub async fn products_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(store::products(&state.http, &state.config).await?))
}

pub async fn add_product_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Ok(Json(product)) = payload else {
        return Err(AppError::MalformedPayload);
    };

    store::insert_product(&state.http, &state.config, &product).await?;

    Ok(StatusCode::CREATED)
}

pub async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    store::delete_product(&state.http, &state.config, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn orders_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(store::orders(&state.http, &state.config).await?))
}
