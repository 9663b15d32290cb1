use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::service::NewDelivery;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", post(create_delivery).get(list_deliveries))
        .route("/deliveries/:id", get(get_delivery))
        .route("/deliveries/order/:order_id", get(get_delivery_by_order))
        .route("/deliveries/driver/:driver_id", get(list_by_driver))
        .route(
            "/deliveries/driver/:driver_id/active",
            get(list_active_by_driver),
        )
        .route("/deliveries/status/:status", get(list_by_status))
        .route("/deliveries/:id/assign", put(assign_driver))
        .route("/deliveries/:id/pickup", put(mark_picked_up))
        .route("/deliveries/:id/transit", put(mark_in_transit))
        .route("/deliveries/:id/delivered", put(mark_delivered))
        .route("/deliveries/:id/cancel", put(cancel_delivery))
}

#[derive(Deserialize)]
pub struct CreateDeliveryRequest {
    pub order_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub restaurant_address: String,
    pub customer_address: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
    pub driver_name: String,
}

#[derive(Deserialize, Default)]
pub struct CancelDeliveryRequest {
    pub reason: Option<String>,
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    if payload.restaurant_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "restaurant address cannot be empty".to_string(),
        ));
    }

    if payload.customer_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "customer address cannot be empty".to_string(),
        ));
    }

    let delivery = state
        .service
        .create(NewDelivery {
            order_id: payload.order_id,
            driver_id: payload.driver_id,
            restaurant_address: payload.restaurant_address,
            customer_address: payload.customer_address,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(delivery)))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.service.get(id)?))
}

async fn get_delivery_by_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.service.get_by_order(order_id)?))
}

async fn list_by_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
) -> Json<Vec<Delivery>> {
    Json(state.service.list_by_driver(driver_id))
}

async fn list_active_by_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
) -> Json<Vec<Delivery>> {
    Json(state.service.list_active_by_driver(driver_id))
}

async fn list_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<DeliveryStatus>,
) -> Json<Vec<Delivery>> {
    Json(state.service.list_by_status(status))
}

async fn list_deliveries(State(state): State<Arc<AppState>>) -> Json<Vec<Delivery>> {
    Json(state.service.list_all())
}

async fn assign_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignDriverRequest>,
) -> Result<Json<Delivery>, AppError> {
    if payload.driver_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "driver name cannot be empty".to_string(),
        ));
    }

    let delivery = state
        .service
        .assign(id, payload.driver_id, payload.driver_name)?;
    Ok(Json(delivery))
}

async fn mark_picked_up(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.service.pickup(id)?))
}

async fn mark_in_transit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.service.transit(id)?))
}

async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.service.deliver(id)?))
}

async fn cancel_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<CancelDeliveryRequest>>,
) -> Result<Json<Delivery>, AppError> {
    let reason = payload
        .and_then(|Json(body)| body.reason)
        .unwrap_or_else(|| "No reason provided".to_string());

    Ok(Json(state.service.cancel(id, reason)?))
}
