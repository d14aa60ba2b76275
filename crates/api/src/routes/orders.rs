//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{OrderId, OrderStatus};
use domain::{
    CreateOrder, DomainError, ListOrders, Order, OrderService, StatusUpdate, TransitionOutcome,
    TransitionStatus,
};
use order_store::OrderStore;
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub order_service: OrderService<S>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// -- Handlers --

/// POST /orders: create an order for the calling client.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(requester): Caller,
    payload: Result<Json<CreateOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(cmd) = payload?;
    let created = state.order_service.create_order(&requester, cmd).await?;

    Ok((StatusCode::CREATED, Json(created.order)))
}

/// GET /orders: list the orders visible to the caller, newest first.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(requester): Caller,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Query(params) = params?;

    let mut filter = ListOrders::new();
    if let Some(status) = params.status {
        filter = filter.status(status.parse::<OrderStatus>().map_err(DomainError::from)?);
    }
    filter.limit = params.limit;
    filter.offset = params.offset;

    let orders = state.order_service.list_orders(&requester, filter).await?;
    Ok(Json(orders))
}

/// GET /orders/{id}: load one order.
#[tracing::instrument(skip(state, id))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(requester): Caller,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(id)?;
    let order = state.order_service.get_order(&requester, order_id).await?;
    Ok(Json(order))
}

/// POST /orders/{id}/status: move an order to a new status.
#[tracing::instrument(skip(state, id, payload))]
pub async fn transition<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(requester): Caller,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    let order_id = parse_order_id(id)?;
    let Json(req) = payload?;

    let cmd = TransitionStatus {
        order_id,
        status: req.status,
        notes: req.notes,
    };
    let outcome = state
        .order_service
        .transition_status(&requester, cmd)
        .await?;

    Ok(Json(outcome))
}

/// GET /orders/{id}/history: status history, oldest first.
#[tracing::instrument(skip(state, id))]
pub async fn history<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(requester): Caller,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<StatusUpdate>>, ApiError> {
    let order_id = parse_order_id(id)?;
    let history = state
        .order_service
        .get_history(&requester, order_id)
        .await?;
    Ok(Json(history))
}

fn parse_order_id(path: Result<Path<String>, PathRejection>) -> Result<OrderId, ApiError> {
    let Path(id) = path?;
    id.parse::<i64>()
        .map(OrderId::new)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id {id:?}: {e}")))
}
