//! Store (order and inventory) route handlers.

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode};
use petstore_core::{Order, OrderId};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Place an order.
pub async fn place_order(
    State(state): State<AppState>,
    ApiJson(order): ApiJson<Order>,
) -> Result<(StatusCode, Json<Order>)> {
    let created = state.orders().create_order(&order).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn show_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().find_order_by_id(id).await?))
}

/// Delete an order. Delivered orders answer 409.
pub async fn delete_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<StatusCode> {
    state.orders().delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order counts by status (auth required).
pub async fn inventory(State(state): State<AppState>) -> Result<Json<BTreeMap<String, i64>>> {
    Ok(Json(state.orders().inventory().await?))
}
