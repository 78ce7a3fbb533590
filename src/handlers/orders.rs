use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::OrderView;
use crate::errors::AppError;
use crate::session::CurrentUser;
use crate::CheckoutSvc;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Unit price at purchase time, not the current catalog price.
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub total: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
}

fn order_response(order: OrderView) -> OrderResponse {
    OrderResponse {
        id: order.id,
        total: order.total.to_string(),
        created_at: order.created_at.to_rfc3339(),
        items: order
            .items
            .into_iter()
            .map(|item| {
                let subtotal = item.subtotal().to_string();
                OrderItemResponse {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price.to_string(),
                    subtotal,
                }
            })
            .collect(),
    }
}

/// GET /orders
///
/// The logged-in user's order history, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Order history", body = ListOrdersResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "orders"
)]
pub async fn order_history(
    user: CurrentUser,
    svc: web::Data<CheckoutSvc>,
) -> Result<HttpResponse, AppError> {
    let svc = svc.clone();
    let orders = web::block(move || svc.order_history(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: orders.into_iter().map(order_response).collect(),
    }))
}
