use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("login required")]
    Unauthorized,

    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("cart is empty")]
    EmptyCart,

    #[error("not enough stock for {product}, available: {available}")]
    InsufficientStock { product: String, available: i32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::EmailTaken => AppError::EmailTaken,
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::EmptyCart => AppError::EmptyCart,
            DomainError::InsufficientStock { product, available } => {
                AppError::InsufficientStock { product, available }
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            // The presentation layer is expected to send the user to /login.
            AppError::Unauthorized => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": self.to_string(),
                "login": "/login"
            })),
            AppError::EmailTaken => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::InvalidCredentials => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::EmptyCart => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::InsufficientStock { product, available } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": self.to_string(),
                    "product": product,
                    "available": available
                }))
            }
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}
