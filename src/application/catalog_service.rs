use uuid::Uuid;

use crate::domain::catalog::{CategoryView, ProductFilter, ProductPage, ProductSort, ProductView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: i64,
    ) -> Result<ProductPage, DomainError> {
        self.repo.list(filter, sort, page.max(1))
    }

    pub fn get_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        self.repo.get(id)
    }

    pub fn categories(&self) -> Result<Vec<CategoryView>, DomainError> {
        self.repo.categories()
    }
}
