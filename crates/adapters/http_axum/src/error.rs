//! HTTP error response mapping.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use placehub_domain::error::{NotFoundError, PlaceHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<&'static str, Vec<String>>>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    fn validation(err: &ValidationError) -> Self {
        let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for violation in err.violations() {
            errors
                .entry(violation.field().as_str())
                .or_default()
                .push(violation.to_string());
        }
        Self {
            message: err.to_string(),
            errors: Some(errors),
        }
    }
}

/// Maps [`PlaceHubError`] and request decoding failures to HTTP responses.
pub enum ApiError {
    /// An error reported by the application layer.
    Domain(PlaceHubError),
    /// The request body could not be decoded.
    Body(JsonRejection),
}

impl ApiError {
    /// A 404 for a place id that does not exist or cannot exist.
    pub(crate) fn place_not_found(id: &str) -> Self {
        Self::Domain(
            NotFoundError {
                entity: "Place",
                id: id.to_string(),
            }
            .into(),
        )
    }
}

impl From<PlaceHubError> for ApiError {
    fn from(err: PlaceHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Domain(PlaceHubError::Validation(err)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorBody::validation(&err))
            }
            Self::Domain(PlaceHubError::NotFound(err)) => {
                (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string()))
            }
            Self::Domain(PlaceHubError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("Server Error"),
                )
            }
            Self::Body(rejection) => {
                tracing::debug!(error = %rejection, "rejected request body");
                (rejection.status(), ErrorBody::message(rejection.body_text()))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use placehub_domain::error::{Field, Violation};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_group_validation_messages_by_field() {
        let err = ValidationError::from_violations(vec![
            Violation::Required(Field::Name),
            Violation::Taken(Field::Slug),
            Violation::Unsluggable,
        ])
        .unwrap();

        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["message"], "The name field is required.");
        assert_eq!(body["errors"]["name"][0], "The name field is required.");
        assert_eq!(body["errors"]["slug"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_map_not_found_to_404() {
        let response = ApiError::place_not_found("999").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Place 999 not found");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn should_hide_storage_details() {
        let err = PlaceHubError::Storage("disk on fire".into());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Server Error");
    }
}
