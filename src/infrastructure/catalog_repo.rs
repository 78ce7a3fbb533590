use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{
    page_count, CategoryView, ProductFilter, ProductPage, ProductSort, ProductView, PAGE_SIZE,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{categories, products};

use super::models::{CategoryRow, ProductRow};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(row: ProductRow, category_name: String) -> ProductView {
    ProductView {
        id: row.id,
        name: row.name,
        description: row.description,
        price: row.price,
        image: row.image,
        category_id: row.category_id,
        category_name,
        stock: row.stock,
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: i64,
    ) -> Result<ProductPage, DomainError> {
        let mut conn = self.pool.get()?;

        let page = page.max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let mut query = products::table
            .inner_join(categories::table)
            .select((ProductRow::as_select(), categories::name))
            .into_boxed();
        let mut count_query = products::table
            .inner_join(categories::table)
            .into_boxed();

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            query = query.filter(products::name.like(pattern.clone()));
            count_query = count_query.filter(products::name.like(pattern));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(products::category_id.eq(category_id));
            count_query = count_query.filter(products::category_id.eq(category_id));
        }

        query = match sort {
            ProductSort::NameAsc => query.order(products::name.asc()),
            ProductSort::PriceAsc => query.order(products::price.asc()),
            ProductSort::PriceDesc => query.order(products::price.desc()),
        };

        let total: i64 = count_query.count().get_result(&mut conn)?;
        let rows: Vec<(ProductRow, String)> = query
            .limit(PAGE_SIZE)
            .offset(offset)
            .load(&mut conn)?;

        Ok(ProductPage {
            items: rows
                .into_iter()
                .map(|(row, category_name)| to_view(row, category_name))
                .collect(),
            page,
            total_pages: page_count(total),
        })
    }

    fn get(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .inner_join(categories::table)
            .filter(products::id.eq(id))
            .select((ProductRow::as_select(), categories::name))
            .first::<(ProductRow, String)>(&mut conn)
            .optional()?;

        Ok(row.map(|(row, category_name)| to_view(row, category_name)))
    }

    fn categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load::<CategoryRow>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|c| CategoryView {
                id: c.id,
                name: c.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::DieselCatalogRepository;
    use crate::domain::catalog::{ProductFilter, ProductSort};
    use crate::domain::ports::CatalogRepository;
    use crate::infrastructure::test_support::{insert_category, insert_product, setup_db};
    use uuid::Uuid;

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);

        let result = repo.get(Uuid::new_v4()).expect("get should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn get_resolves_category_name() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let category_id = insert_category(&mut conn, "Electronics");
        let product_id = insert_product(&mut conn, "Phone", "999.99", 10, category_id);

        let product = repo
            .get(product_id)
            .expect("get failed")
            .expect("product should exist");

        assert_eq!(product.name, "Phone");
        assert_eq!(product.category_name, "Electronics");
        assert_eq!(product.stock, 10);
    }

    #[tokio::test]
    async fn list_sorts_by_price_descending() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let category_id = insert_category(&mut conn, "Misc");
        insert_product(&mut conn, "Cheap", "5.00", 10, category_id);
        insert_product(&mut conn, "Pricey", "50.00", 10, category_id);
        insert_product(&mut conn, "Middling", "20.00", 10, category_id);

        let page = repo
            .list(&ProductFilter::default(), ProductSort::PriceDesc, 1)
            .expect("list failed");

        let prices: Vec<_> = page.items.iter().map(|p| p.price.clone()).collect();
        for pair in prices.windows(2) {
            assert!(pair[0] >= pair[1], "prices must be non-increasing");
        }
        assert_eq!(page.items[0].name, "Pricey");
    }

    #[tokio::test]
    async fn list_paginates_at_six_per_page() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let category_id = insert_category(&mut conn, "Misc");
        for i in 0..8 {
            insert_product(&mut conn, &format!("Item {:02}", i), "1.00", 10, category_id);
        }

        let page1 = repo
            .list(&ProductFilter::default(), ProductSort::NameAsc, 1)
            .expect("list page 1 failed");
        assert_eq!(page1.items.len(), 6);
        assert_eq!(page1.total_pages, 2);

        let page2 = repo
            .list(&ProductFilter::default(), ProductSort::NameAsc, 2)
            .expect("list page 2 failed");
        assert_eq!(page2.items.len(), 2);
        assert_eq!(page2.page, 2);
    }

    #[tokio::test]
    async fn list_filters_by_name_substring() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let category_id = insert_category(&mut conn, "Misc");
        insert_product(&mut conn, "Coffee Maker", "149.99", 8, category_id);
        insert_product(&mut conn, "Yoga Mat", "29.99", 30, category_id);

        let filter = ProductFilter {
            search: Some("Coffee".to_string()),
            category_id: None,
        };
        let page = repo
            .list(&filter, ProductSort::NameAsc, 1)
            .expect("list failed");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Coffee Maker");
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let electronics = insert_category(&mut conn, "Electronics");
        let fashion = insert_category(&mut conn, "Fashion");
        insert_product(&mut conn, "Phone", "999.99", 10, electronics);
        insert_product(&mut conn, "Jacket", "89.99", 15, fashion);

        let filter = ProductFilter {
            search: None,
            category_id: Some(fashion),
        };
        let page = repo
            .list(&filter, ProductSort::NameAsc, 1)
            .expect("list failed");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Jacket");

        let cats = repo.categories().expect("categories failed");
        assert_eq!(cats.len(), 2);
    }
}
