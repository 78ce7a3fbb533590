use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartView;
use crate::errors::AppError;
use crate::session::CurrentUser;
use crate::CartSvc;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: String,
    pub quantity: i32,
    pub stock: i32,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total: String,
}

pub(crate) fn cart_response(cart: CartView) -> CartResponse {
    let total = cart.total().to_string();
    CartResponse {
        items: cart
            .lines
            .into_iter()
            .map(|line| {
                let line_total = line.line_total().to_string();
                CartLineResponse {
                    product_id: line.product_id,
                    name: line.name,
                    unit_price: line.unit_price.to_string(),
                    quantity: line.quantity,
                    stock: line.stock,
                    line_total,
                }
            })
            .collect(),
        total,
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The user's cart", body = CartResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "cart"
)]
pub async fn view_cart(
    user: CurrentUser,
    svc: web::Data<CartSvc>,
) -> Result<HttpResponse, AppError> {
    let svc = svc.clone();
    let cart = web::block(move || svc.view_cart(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(cart_response(cart)))
}

/// POST /cart
///
/// Bulk update. The form carries either `quantity_{productId}` fields (new
/// quantities, clamped into [1, 100]) or a single `remove={productId}` field.
/// Malformed ids and non-numeric quantities are skipped silently, tolerating
/// tampered form input. Responds with the updated cart.
#[utoipa::path(
    post,
    path = "/cart",
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "cart"
)]
pub async fn update_cart(
    user: CurrentUser,
    svc: web::Data<CartSvc>,
    form: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let user_id = user.id;

    let svc = svc.clone();
    let cart = web::block(move || {
        if let Some(raw_id) = form.get("remove") {
            if let Ok(product_id) = Uuid::parse_str(raw_id) {
                svc.remove_item(user_id, product_id)?;
            }
        } else {
            for (key, value) in &form {
                let Some(raw_id) = key.strip_prefix("quantity_") else {
                    continue;
                };
                let Ok(product_id) = Uuid::parse_str(raw_id) else {
                    continue;
                };
                let Ok(quantity) = value.parse::<i32>() else {
                    continue;
                };
                svc.set_item_quantity(user_id, product_id, quantity)?;
            }
        }
        svc.view_cart(user_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(cart_response(cart)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddToCartResponse {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// GET /add_to_cart/{product_id}
///
/// Adds one unit of the product to the cart, creating the line if needed.
#[utoipa::path(
    get,
    path = "/add_to_cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Resulting cart line quantity", body = AddToCartResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    user: CurrentUser,
    svc: web::Data<CartSvc>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let svc = svc.clone();
    let quantity = web::block(move || svc.add_to_cart(user.id, product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(AddToCartResponse {
        product_id,
        quantity,
    }))
}
