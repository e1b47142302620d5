//! Owner identity extraction.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;

/// Header carrying the authenticated owner id, set by the upstream auth layer.
pub const OWNER_HEADER: &str = "x-owner-id";

/// The authenticated owner of a request.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        Ok(Owner(owner.to_string()))
    }
}
