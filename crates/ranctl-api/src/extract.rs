//! A `Json` extractor whose rejection matches this crate's own error
//! shape, so a malformed request body gets the same `{"error": "..."}`
//! envelope as every other input error instead of Axum's default
//! plain-text rejection body.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Deserializes a JSON request body, rejecting with [`ApiError::Parse`].
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) =
            Json::<T>::from_request(req, state).await.map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(Self(value))
    }
}
