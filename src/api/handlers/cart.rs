//! Cart endpoints - add, increase, decrease, remove, get and clear.
//!
//! Every endpoint answers with the whole cart as `cartData` so the client can
//! replace its local copy.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::RawId;
use crate::{
    api::{AppState, auth::AuthUser, response::ApiJson},
    core::cart::{self, NewCartItem},
    entities::cart_item,
    errors::{Error, Result},
};

/// Body of `POST /api/user/add`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    /// Catalog identifier
    pub id: Option<RawId>,
    /// Item name
    pub name: Option<String>,
    /// Item image URL
    pub image_url: Option<String>,
    /// Unit price
    pub price: Option<f64>,
}

/// Body of the single-item cart endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    /// Catalog identifier of the cart entry
    pub product_id: Option<RawId>,
}

impl CartItemRequest {
    fn item_id(self) -> Result<String> {
        self.product_id
            .map(RawId::into_string)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::invalid_argument("productId is required"))
    }
}

/// One cart entry as sent to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntryView {
    /// Catalog identifier
    pub id: String,
    /// Item name
    pub name: String,
    /// Item image URL
    pub image_url: String,
    /// Unit price
    pub price: f64,
    /// Units in the cart
    pub quantity: i32,
    /// When the item was first added
    pub added_at: DateTime<Utc>,
}

impl From<cart_item::Model> for CartEntryView {
    fn from(entry: cart_item::Model) -> Self {
        Self {
            id: entry.item_id,
            name: entry.name,
            image_url: entry.image_url,
            price: entry.price,
            quantity: entry.quantity,
            added_at: entry.added_at,
        }
    }
}

/// Response shared by all cart endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    /// Always true
    pub success: bool,
    /// Human-readable outcome
    pub message: &'static str,
    /// The full cart after the operation
    pub cart_data: Vec<CartEntryView>,
}

impl CartResponse {
    fn new(message: &'static str, cart: Vec<cart_item::Model>) -> Json<Self> {
        Json(Self {
            success: true,
            message,
            cart_data: cart.into_iter().map(CartEntryView::from).collect(),
        })
    }
}

/// Adds one unit of an item, merging with an existing entry.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    let missing = || Error::invalid_argument("All fields (id, name, imageUrl, price) are required");

    let item = NewCartItem {
        item_id: payload.id.map(RawId::into_string).ok_or_else(missing)?,
        name: payload.name.ok_or_else(missing)?,
        image_url: payload.image_url.ok_or_else(missing)?,
        price: payload.price.ok_or_else(missing)?,
    };

    let added = cart::add_item(&state.database, user.id, item).await?;
    let message = if added.merged {
        "Item quantity updated in cart"
    } else {
        "Item added to cart successfully"
    };
    Ok(CartResponse::new(message, added.cart))
}

/// Adds one unit to an entry already in the cart.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn increase_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CartItemRequest>,
) -> Result<Json<CartResponse>> {
    let item_id = payload.item_id()?;
    let cart = cart::increase_quantity(&state.database, user.id, &item_id).await?;
    Ok(CartResponse::new("Quantity increased", cart))
}

/// Removes one unit from an entry, refusing to go below 1.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn decrease_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CartItemRequest>,
) -> Result<Json<CartResponse>> {
    let item_id = payload.item_id()?;
    let cart = cart::decrease_quantity(&state.database, user.id, &item_id).await?;
    Ok(CartResponse::new("Quantity decreased", cart))
}

/// Drops an entry from the cart; absent entries are not an error.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CartItemRequest>,
) -> Result<Json<CartResponse>> {
    let item_id = payload.item_id()?;
    let cart = cart::remove_item(&state.database, user.id, &item_id).await?;
    Ok(CartResponse::new("Item removed from cart", cart))
}

/// Returns the cart.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CartResponse>> {
    let cart = cart::get_cart(&state.database, user.id).await?;
    Ok(CartResponse::new("Cart fetched successfully", cart))
}

/// Empties the cart.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CartResponse>> {
    let cart = cart::clear_cart(&state.database, user.id).await?;
    info!("Cart cleared on request");
    Ok(CartResponse::new("Cart cleared successfully", cart))
}
