//! Validated JSON extractor
//!
//! Extracts and validates JSON request bodies using the validator crate.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::header::CONTENT_LENGTH,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::response::ApiError;

/// JSON body that passed `Validate`
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| match e {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                ApiError::bad_request("Invalid JSON body")
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::bad_request("Expected a JSON body")
            }
            _ => ApiError::bad_request("Invalid request body"),
        })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Like `ValidatedJson`, but an empty body yields `None`
#[derive(Debug, Clone)]
pub struct OptionalValidatedJson<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let has_body = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok())
            .is_some_and(|len| len > 0);

        if !has_body {
            return Ok(OptionalValidatedJson(None));
        }

        let ValidatedJson(value) = ValidatedJson::from_request(req, state).await?;
        Ok(OptionalValidatedJson(Some(value)))
    }
}
