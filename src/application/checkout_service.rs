use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::ports::OrderRepository;

pub struct CheckoutService<R> {
    repo: R,
}

impl<R: OrderRepository> CheckoutService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Materialize the user's cart into an order. The repository runs the
    /// stock check, order creation, stock decrement, and cart clearing as one
    /// transaction, so either all of it happens or none of it does.
    pub fn place_order(&self, user_id: Uuid) -> Result<Uuid, DomainError> {
        self.repo.checkout(user_id)
    }

    pub fn order_history(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_for_user(user_id)
    }
}
