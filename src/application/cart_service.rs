use uuid::Uuid;

use crate::domain::cart::CartView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Add a single unit of the product to the user's cart.
    pub fn add_to_cart(&self, user_id: Uuid, product_id: Uuid) -> Result<i32, DomainError> {
        self.repo.add(user_id, product_id, 1)
    }

    pub fn set_item_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), DomainError> {
        self.repo.set_quantity(user_id, product_id, quantity)
    }

    pub fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        self.repo.remove(user_id, product_id)
    }

    pub fn view_cart(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        self.repo.list(user_id)
    }
}
