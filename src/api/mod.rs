pub mod attendance;
pub mod dashboard;
pub mod employee;

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde::Serialize;

use crate::error::ApiError;
use crate::validation::FieldErrors;

/// `{"message": ..., "data": ...}` success body.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Invalid {
        message: "Invalid request body",
        errors: FieldErrors::non_field(err.to_string()),
    }
    .into()
}

/// Malformed JSON bodies answer with the same envelope as validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}
