use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{Decimal, InstrumentId, Order, OrderId, OrderKind, OrderStatus, Side, UserId};
use crate::error::AppError;
use crate::service::CreateOrder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub instrument_id: i64,
    pub side: Side,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub size: Option<i64>,
    pub amount: Option<Decimal>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: OrderId,
    pub user_id: UserId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub size: i64,
    pub price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            instrument_id: order.instrument_id,
            side: order.side,
            kind: order.kind,
            size: order.size,
            price: order.price,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>), AppError> {
    let order = state
        .orders
        .create_order(CreateOrder {
            user_id: UserId::new(body.user_id),
            instrument_id: InstrumentId::new(body.instrument_id),
            side: body.side,
            kind: body.kind,
            size: body.size,
            amount: body.amount,
            price: body.price,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn get_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<OrderDto>>, AppError> {
    let orders = state.orders.orders_for_user(UserId::new(user_id)).await?;
    Ok(Json(orders.into_iter().map(OrderDto::from).collect()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDto>, AppError> {
    let order = state.orders.cancel_order(OrderId::new(order_id)).await?;
    Ok(Json(order.into()))
}
