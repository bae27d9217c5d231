//! Requesting-user extraction
//!
//! Identity comes from the `X-User-Id` header set by the fronting gateway.
//! Authentication itself happens upstream.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use forum_common::db::models::User;
use forum_common::providers::UserDirectory;
use forum_common::UserId;

use super::error::ApiError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Active account named by `X-User-Id`
#[derive(Debug, Clone)]
pub struct Requester(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing X-User-Id header".to_string()))?;

        let id: UserId = raw
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ApiError::Unauthorized("malformed X-User-Id header".to_string()))?;

        match state.store.user_by_id(id).await? {
            Some(user) if user.is_active => Ok(Requester(user)),
            _ => Err(ApiError::Unauthorized(format!("unknown user {}", id))),
        }
    }
}
