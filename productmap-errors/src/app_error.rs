use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Reverse geocoding failed: {0}")]
    GeocodeFailure(String),

    #[error("Failed to create product record: {0}")]
    StoreCreateFailure(String),

    #[error("Failed to update product record: {0}")]
    StoreUpdateFailure(String),

    #[error("Failed to delete product record: {0}")]
    StoreDeleteFailure(String),

    #[error("Failed to increment upvote count: {0}")]
    StoreIncrementFailure(String),

    #[error("Failed to read product records: {0}")]
    StoreReadFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} is not allowed while the session is {state}")]
    InvalidState { operation: String, state: String },

    #[error("Product not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_state(operation: &str, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            operation: operation.to_string(),
            state: state.to_string(),
        }
    }

    /// Stable identifier used on the event channel and in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GeocodeFailure(_) => "geocode_failure",
            Self::StoreCreateFailure(_) => "store_create_failure",
            Self::StoreUpdateFailure(_) => "store_update_failure",
            Self::StoreDeleteFailure(_) => "store_delete_failure",
            Self::StoreIncrementFailure(_) => "store_increment_failure",
            Self::StoreReadFailure(_) => "store_read_failure",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidState { .. } => "invalid_state",
            Self::NotFound => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Text safe to show to the person using the map; upstream details stay
    /// in logs and on the event channel.
    pub fn user_message(&self) -> &str {
        match self {
            Self::GeocodeFailure(_) => "We couldn't find a city for that spot. Try again.",
            Self::StoreCreateFailure(_) => "The product couldn't be saved. Try again later.",
            Self::StoreUpdateFailure(_) => "Your product details weren't saved.",
            Self::StoreDeleteFailure(_) => "The discarded product couldn't be removed.",
            Self::StoreIncrementFailure(_) => "Your upvote didn't reach the server.",
            Self::StoreReadFailure(_) => "Products couldn't be loaded. Try again later.",
            Self::InvalidInput(_) => "Some of the values you entered are not valid.",
            Self::InvalidState { .. } => "That action isn't available right now.",
            Self::NotFound => "Product not found.",
            Self::Internal(_) => "Something went wrong. Try again later.",
        }
    }
}

#[cfg(feature = "http")]
mod http_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        kind: &'static str,
        message: String,
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = match &self {
                AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AppError::InvalidState { .. } => StatusCode::CONFLICT,
                AppError::NotFound => StatusCode::NOT_FOUND,
                AppError::GeocodeFailure(_)
                | AppError::StoreCreateFailure(_)
                | AppError::StoreUpdateFailure(_)
                | AppError::StoreDeleteFailure(_)
                | AppError::StoreIncrementFailure(_)
                | AppError::StoreReadFailure(_) => StatusCode::BAD_GATEWAY,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = ErrorResponse {
                kind: self.kind(),
                message: self.user_message().to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}
