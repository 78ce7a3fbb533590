use uuid::Uuid;

use super::cart::CartView;
use super::catalog::{CategoryView, ProductFilter, ProductPage, ProductSort, ProductView};
use super::errors::DomainError;
use super::order::OrderView;
use super::user::UserProfile;

pub trait CatalogRepository: Send + Sync + 'static {
    fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: i64,
    ) -> Result<ProductPage, DomainError>;
    fn get(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    fn categories(&self) -> Result<Vec<CategoryView>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Create the cart line at the clamped delta, or bump an existing one.
    /// Returns the resulting quantity. Unknown products are an error.
    fn add(&self, user_id: Uuid, product_id: Uuid, delta: i32) -> Result<i32, DomainError>;
    /// Clamp into [1, 100]; silently does nothing when the line is absent.
    fn set_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32)
        -> Result<(), DomainError>;
    /// Silently does nothing when the line is absent.
    fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<(), DomainError>;
    fn list(&self, user_id: Uuid) -> Result<CartView, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Turn the user's cart into an order in a single transaction.
    /// See `DieselOrderRepository::checkout` for the step-by-step contract.
    fn checkout(&self, user_id: Uuid) -> Result<Uuid, DomainError>;
    /// The user's orders, newest first, with resolved line items.
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
}

pub trait AccountRepository: Send + Sync + 'static {
    fn insert(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        address: &str,
    ) -> Result<UserProfile, DomainError>;
    /// Returns the profile together with the stored password hash.
    fn find_by_email(&self, email: &str) -> Result<Option<(UserProfile, String)>, DomainError>;
    /// Partial update; `None` fields keep their prior value.
    fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        address: Option<String>,
    ) -> Result<UserProfile, DomainError>;
}

pub trait SessionStore: Send + Sync + 'static {
    /// Create a session row and return its token.
    fn create(&self, user_id: Uuid) -> Result<Uuid, DomainError>;
    /// Resolve a token to its user, ignoring expired sessions.
    fn find_user(&self, token: Uuid) -> Result<Option<UserProfile>, DomainError>;
    fn delete(&self, token: Uuid) -> Result<(), DomainError>;
}
