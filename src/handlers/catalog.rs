use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::{CategoryView, ProductFilter, ProductSort, ProductView};
use crate::errors::AppError;
use crate::CatalogSvc;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListProductsParams {
    /// Page number (1-based). Malformed values fall back to 1.
    pub page: Option<String>,
    /// Substring match on product name.
    pub search: Option<String>,
    /// Category id filter. Malformed values are ignored.
    pub category: Option<String>,
    /// One of `price_low`, `price_high`, `name` (default).
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub image: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProductsResponse {
    pub items: Vec<ProductResponse>,
    pub page: i64,
    pub total_pages: i64,
    pub categories: Vec<CategoryResponse>,
}

fn product_response(p: ProductView) -> ProductResponse {
    ProductResponse {
        id: p.id,
        name: p.name,
        description: p.description,
        price: p.price.to_string(),
        image: p.image,
        category_id: p.category_id,
        category_name: p.category_name,
        stock: p.stock,
    }
}

fn category_response(c: CategoryView) -> CategoryResponse {
    CategoryResponse {
        id: c.id,
        name: c.name,
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /
///
/// Paginated catalog listing with optional search, category filter, and sort.
/// Malformed `page` or `category` values are ignored rather than rejected.
#[utoipa::path(
    get,
    path = "/",
    params(
        ("page" = Option<String>, Query, description = "Page number (1-based, default 1)"),
        ("search" = Option<String>, Query, description = "Substring match on product name"),
        ("category" = Option<String>, Query, description = "Category id filter"),
        ("sort" = Option<String>, Query, description = "price_low, price_high, or name"),
    ),
    responses(
        (status = 200, description = "One page of products", body = ListProductsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    svc: web::Data<CatalogSvc>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let page: i64 = params
        .page
        .as_deref()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let filter = ProductFilter {
        search: params.search.filter(|s| !s.is_empty()),
        category_id: params
            .category
            .as_deref()
            .and_then(|c| Uuid::parse_str(c).ok()),
    };
    let sort = params
        .sort
        .as_deref()
        .map(ProductSort::from_param)
        .unwrap_or_default();

    let svc = svc.clone();
    let (page, categories) = web::block(move || {
        let page = svc.list_products(&filter, sort, page)?;
        let categories = svc.categories()?;
        Ok::<_, AppError>((page, categories))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListProductsResponse {
        items: page.items.into_iter().map(product_response).collect(),
        page: page.page,
        total_pages: page.total_pages,
        categories: categories.into_iter().map(category_response).collect(),
    }))
}

/// GET /product/{id}
#[utoipa::path(
    get,
    path = "/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn product_detail(
    svc: web::Data<CatalogSvc>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let svc = svc.clone();
    let product = web::block(move || svc.get_product(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(p) => Ok(HttpResponse::Ok().json(product_response(p))),
        None => Err(AppError::NotFound),
    }
}
