// src/shared/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use super::shared_structs::GenericResponse;

/// Error type shared by every layer of the service.
///
/// The `Display` text is what callers see in the `message` field, so the
/// product/stock variants keep the plain wording clients already match on.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unparseable request body, query string or date.
    #[error("{0}")]
    BadRequest(String),

    /// Input that parsed but breaks a business rule.
    #[error("{0}")]
    Validation(String),

    #[error("product id {0} not found")]
    ProductNotFound(i32),

    #[error("insufficient stock for product id {product_id} (available {available}, requested {requested})")]
    InsufficientStock {
        product_id: i32,
        available: i32,
        requested: i32,
    },

    /// Subtotal or total does not fit the amount type.
    #[error("amount overflow for product id {0}")]
    AmountOverflow(i32),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            // Failed checkouts have always surfaced as 500s, not-found included.
            AppError::ProductNotFound(_)
            | AppError::InsufficientStock { .. }
            | AppError::AmountOverflow(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        HttpResponse::build(status).json(GenericResponse::error(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            AppError::BadRequest("Invalid request body".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Validation("end_date must be on or after start_date".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn checkout_failures_map_to_500_with_raw_message() {
        let err = AppError::ProductNotFound(42);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "product id 42 not found");

        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
    }

    #[test]
    fn amount_overflow_is_a_checkout_failure() {
        let err = AppError::AmountOverflow(5);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "amount overflow for product id 5");
    }

    #[test]
    fn insufficient_stock_names_the_product() {
        let err = AppError::InsufficientStock {
            product_id: 3,
            available: 1,
            requested: 4,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product id 3 (available 1, requested 4)"
        );
    }
}
