//! Request extractors

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use core_kernel::CallContext;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;
use crate::AppState;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// JSON body that passed `validator` checks
///
/// Malformed JSON is rejected with 422, failed validation with 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Call context for the provider, bounded by the configured request timeout
///
/// The correlation id is taken from the `x-request-id` header set by the
/// request-id layer.
#[derive(Debug, Clone)]
pub struct RequestContext(pub CallContext);

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut ctx = CallContext::new().with_timeout(state.config.request_timeout());
        if let Some(request_id) = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            ctx = ctx.with_correlation_id(request_id);
        }
        Ok(Self(ctx))
    }
}
