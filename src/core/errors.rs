use crate::models::{ObjectClass, RespondentClass};
use crate::services::StoreError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::{json, Value};
use thiserror::Error;

/// Which endpoint rejected a request; the missing-parameter text differs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Survey,
    Touchpoint,
}

/// Every way a request can fail
///
/// Parameter shape problems are 400, semantic validation problems are 422,
/// and references to rows that do not exist are 404.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unpermitted parameters: {unpermitted:?}")]
    UnpermittedParameters {
        unpermitted: Vec<String>,
        valid: Vec<&'static str>,
    },

    #[error("missing parameters: {missing:?}")]
    MissingParameters {
        endpoint: Endpoint,
        missing: Vec<String>,
        required: Vec<&'static str>,
    },

    #[error("parameter rejected by sanitizer: {key}")]
    DataIntegrity { key: String },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid score: {provided}")]
    InvalidScore { provided: String },

    #[error("invalid class: {respondent_class} / {object_class}")]
    InvalidClass {
        respondent_class: String,
        object_class: String,
    },

    #[error("{class} {provided} not found")]
    RespondentNotFound {
        class: RespondentClass,
        provided: String,
    },

    #[error("{class} {provided} not found")]
    ObjectNotFound { class: ObjectClass, provided: String },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

fn quoted_list<I: IntoIterator<Item = &'static str>>(names: I) -> String {
    names
        .into_iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnpermittedParameters { .. }
            | ApiError::MissingParameters { .. }
            | ApiError::DataIntegrity { .. }
            | ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidScore { .. } | ApiError::InvalidClass { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::RespondentNotFound { .. } | ApiError::ObjectNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body: an `error` message plus hints for correcting the request
    pub fn body(&self) -> Value {
        match self {
            ApiError::UnpermittedParameters { valid, .. } => json!({
                "error": "Unpermitted request parameter(s)!",
                "valid_parameters": valid,
            }),
            ApiError::MissingParameters {
                endpoint, required, ..
            } => json!({
                "error": match endpoint {
                    Endpoint::Survey => "Required parameter(s) missing!",
                    Endpoint::Touchpoint => "Required parameter missing!",
                },
                "required_parameters": required,
            }),
            ApiError::DataIntegrity { .. } => json!({
                "error": "Parameters rejected due to data integrity concerns!",
            }),
            ApiError::MalformedPayload(message) => json!({
                "error": "Malformed request payload!",
                "message": message,
            }),
            ApiError::InvalidScore { provided } => json!({
                "error": format!("'{}' is not a valid score!", provided),
                "valid_score": "1 <= score <= 10",
                "valid_score_type": "integer",
            }),
            ApiError::InvalidClass {
                respondent_class,
                object_class,
            } => json!({
                "error": format!(
                    "'{}' and / or '{}' not a valid class.",
                    respondent_class, object_class
                ),
                "valid_respondent_classes": quoted_list(RespondentClass::ALL.map(RespondentClass::as_str)),
                "valid_object_classes": quoted_list(ObjectClass::ALL.map(ObjectClass::as_str)),
            }),
            ApiError::RespondentNotFound { class, provided } => json!({
                "error": format!("Invalid {}_id", class),
                "provided_value": provided,
            }),
            ApiError::ObjectNotFound { class, provided } => json!({
                "error": format!("Invalid {}_id", class),
                "provided_value": provided,
            }),
            ApiError::Storage(_) => json!({
                "error": "Internal server error",
            }),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Storage(e) => tracing::error!("Request failed on storage: {}", e),
            other => tracing::info!("Request rejected ({}): {}", other.status(), other),
        }

        HttpResponse::build(self.status()).json(self.body())
    }
}
