//! Order endpoints - place an order and list order history.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::RawId;
use crate::{
    api::{AppState, auth::AuthUser, response::ApiJson},
    core::order::{self, DeliveryAddress, LineItem, NewOrder, PlacedOrder},
    errors::{Error, Result},
};

/// One line of `POST /api/user/create`; cart entries can be sent as-is.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    /// Catalog identifier
    pub id: Option<RawId>,
    /// Item name
    pub name: Option<String>,
    /// Units ordered
    pub quantity: Option<i32>,
    /// Unit price
    pub price: Option<f64>,
}

impl TryFrom<OrderItemRequest> for LineItem {
    type Error = Error;

    fn try_from(item: OrderItemRequest) -> Result<Self> {
        let missing = || Error::invalid_argument("Every order item needs id, name, quantity and price");
        Ok(Self {
            item_id: item.id.map(RawId::into_string).ok_or_else(missing)?,
            name: item.name.ok_or_else(missing)?,
            quantity: item.quantity.ok_or_else(missing)?,
            unit_price: item.price.ok_or_else(missing)?,
        })
    }
}

/// Body of `POST /api/user/create`
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Line items
    pub items: Option<Vec<OrderItemRequest>>,
    /// Total the client computed
    pub amount: Option<f64>,
    /// Delivery address
    pub address: Option<DeliveryAddress>,
}

/// Response of `POST /api/user/create`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Always true
    pub success: bool,
    /// Confirmation text
    pub message: &'static str,
    /// Identifier of the new order
    pub order_id: i64,
    /// Total stored on the order
    pub amount: f64,
}

/// One line item as sent to clients
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    /// Catalog identifier
    pub id: String,
    /// Item name
    pub name: String,
    /// Units ordered
    pub quantity: i32,
    /// Unit price
    pub price: f64,
}

/// One order as sent to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// Order identifier
    pub id: i64,
    /// Owner
    pub user_id: i64,
    /// Line items
    pub items: Vec<OrderItemView>,
    /// Delivery address
    pub address: DeliveryAddress,
    /// Total amount
    pub amount: f64,
    /// Placement time in milliseconds since the epoch
    pub date: i64,
    /// Placement time
    pub created_at: DateTime<Utc>,
}

impl From<PlacedOrder> for OrderView {
    fn from(placed: PlacedOrder) -> Self {
        let address = placed.address();
        let PlacedOrder { order, items } = placed;
        Self {
            id: order.id,
            user_id: order.user_id,
            items: items
                .into_iter()
                .map(|item| OrderItemView {
                    id: item.item_id,
                    name: item.name,
                    quantity: item.quantity,
                    price: item.unit_price,
                })
                .collect(),
            address,
            amount: order.amount,
            date: order.created_at.timestamp_millis(),
            created_at: order.created_at,
        }
    }
}

/// Response of `GET /api/user/listOrders`
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    /// Always true
    pub success: bool,
    /// Orders, most recent first
    pub orders: Vec<OrderView>,
}

/// Settles the submitted items into an order (cash on delivery).
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let (Some(items), Some(address)) = (payload.items, payload.address) else {
        return Err(Error::invalid_argument("All fields are required"));
    };

    let new_order = NewOrder {
        items: items
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>>>()?,
        address,
        declared_amount: payload.amount,
    };

    let placed = order::place_order(
        &state.database,
        user.id,
        new_order,
        &state.config.orders,
    )
    .await?;

    info!("Order {} placed", placed.order.id);
    Ok(Json(CreateOrderResponse {
        success: true,
        message: "Order Placed",
        order_id: placed.order.id,
        amount: placed.order.amount,
    }))
}

/// Lists the caller's orders; no orders yields an empty list.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<OrderListResponse>> {
    let orders = order::list_orders(&state.database, user.id).await?;
    Ok(Json(OrderListResponse {
        success: true,
        orders: orders.into_iter().map(OrderView::from).collect(),
    }))
}
