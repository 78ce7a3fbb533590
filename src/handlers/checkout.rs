use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::cart::{cart_response, CartResponse};
use crate::errors::AppError;
use crate::session::CurrentUser;
use crate::{CartSvc, CheckoutSvc};

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub id: Uuid,
}

/// GET /checkout
///
/// Checkout preview: the cart as it would be purchased. Stock is not
/// validated here; only placing the order checks it.
#[utoipa::path(
    get,
    path = "/checkout",
    responses(
        (status = 200, description = "Cart to be purchased", body = CartResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "checkout"
)]
pub async fn preview(
    user: CurrentUser,
    carts: web::Data<CartSvc>,
) -> Result<HttpResponse, AppError> {
    let carts = carts.clone();
    let cart = web::block(move || carts.view_cart(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(cart_response(cart)))
}

/// POST /checkout
///
/// Places the order. The entire cart-to-order transition (stock check, order
/// and line-item creation with snapshotted prices, stock decrement, cart
/// clearing) is one database transaction; an empty cart or a line exceeding
/// stock aborts it with no writes at all.
#[utoipa::path(
    post,
    path = "/checkout",
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Cart is empty"),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Insufficient stock for a cart line"),
    ),
    tag = "checkout"
)]
pub async fn place_order(
    user: CurrentUser,
    svc: web::Data<CheckoutSvc>,
) -> Result<HttpResponse, AppError> {
    let svc = svc.clone();
    let order_id = web::block(move || svc.place_order(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": order_id })))
}
