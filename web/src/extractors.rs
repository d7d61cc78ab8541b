//! Request extractors shared by the handlers.
//!
//! Axum's stock `Json` extractor reports malformed bodies as plain-text
//! rejections. The API promises `{ "code", "message" }` bodies for every
//! error, so handlers take [`AppJson`] instead, which funnels rejections
//! through [`AppError::validation`].

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejection is a `VALIDATION_ERROR` response.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::validation(rejection.body_text())),
        }
    }
}
