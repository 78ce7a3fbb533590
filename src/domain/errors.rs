use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("cart is empty")]
    EmptyCart,
    #[error("not enough stock for {product}, available: {available}")]
    InsufficientStock { product: String, available: i32 },
    #[error("internal error: {0}")]
    Internal(String),
}
