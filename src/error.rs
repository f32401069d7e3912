use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

use crate::store::StoreError;
use crate::validation::FieldErrors;

pub const INTERNAL_MESSAGE: &str = "Something went wrong, Contact with system admin";

#[derive(Debug, Display)]
pub enum ApiError {
    /// 400 with a field-keyed `errors` map.
    #[display(fmt = "{}", message)]
    Invalid {
        message: &'static str,
        errors: FieldErrors,
    },
    #[display(fmt = "{}", _0)]
    NotFound(&'static str),
    #[display(fmt = "{}", INTERNAL_MESSAGE)]
    Internal,
}

impl ApiError {
    pub fn invalid(message: &'static str) -> impl FnOnce(FieldErrors) -> ApiError {
        move |errors| ApiError::Invalid { message, errors }
    }

    /// Maps a store failure. `failure` heads validation and conflict
    /// responses, `not_found` is the 404 message.
    pub fn from_store(
        err: StoreError,
        failure: &'static str,
        not_found: &'static str,
    ) -> ApiError {
        match err {
            StoreError::NotFound => ApiError::NotFound(not_found),
            StoreError::UnknownEmployee(id) => ApiError::Invalid {
                message: failure,
                errors: FieldErrors::single(
                    "employee",
                    format!("Invalid pk \"{id}\" - object does not exist."),
                ),
            },
            StoreError::Conflict(errors) => ApiError::Invalid {
                message: failure,
                errors,
            },
            StoreError::Database(e) => {
                error!(error = %e, "Record store failure");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invalid { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Invalid { message, errors } => json!({
                "message": message,
                "errors": errors,
            }),
            _ => json!({ "message": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
