//! Cart error taxonomy and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by cart operations.
///
/// Every variant propagates synchronously to the handler layer; none of them
/// is retried internally, and a failed operation leaves the cart unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    #[error("product {0} not found or inactive")]
    ProductNotFound(Uuid),

    #[error("cart {0} not found")]
    CartNotFound(Uuid),

    #[error("cart item {0} not found")]
    ItemNotFound(Uuid),

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("authenticated user required")]
    Unauthenticated,
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let status = match self {
            CartError::ProductNotFound(_)
            | CartError::CartNotFound(_)
            | CartError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            CartError::InvalidQuantity => StatusCode::UNPROCESSABLE_ENTITY,
            CartError::Unauthenticated => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}
