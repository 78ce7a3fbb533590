use bigdecimal::BigDecimal;
use uuid::Uuid;

/// Fixed storefront page size.
pub const PAGE_SIZE: i64 = 6;

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub image: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring match on the product name.
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    NameAsc,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// Maps the `sort` query parameter; unknown values fall back to name order.
    pub fn from_param(param: &str) -> Self {
        match param {
            "price_low" => ProductSort::PriceAsc,
            "price_high" => ProductSort::PriceDesc,
            _ => ProductSort::NameAsc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    pub page: i64,
    pub total_pages: i64,
}

pub fn page_count(total_items: i64) -> i64 {
    (total_items + PAGE_SIZE - 1) / PAGE_SIZE
}
