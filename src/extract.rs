use axum::{
    async_trait,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// JSON body that has been deserialized and validated.
///
/// Unlike `Json`, every rejection (bad content type, malformed JSON, failed
/// validation) becomes a 400 `ApiError::Validation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                debug!("Rejected request body: {}", rejection.body_text());
                ApiError::Validation(rejection.body_text())
            })?;

        value
            .validate()
            .map_err(|errors| ApiError::Validation(first_message(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

/// Path parameters whose rejection (e.g. `/units/abc`) is reported as a
/// 400 `ApiError::Validation` with the usual JSON error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                debug!("Rejected path {}: {}", parts.uri.path(), rejection.body_text());
                ApiError::Validation(rejection.body_text())
            })?;
        Ok(ValidatedPath(value))
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .find_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_first_message_uses_field_message() {
        let errors = Named {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(first_message(&errors), "Name is required");
    }
}
