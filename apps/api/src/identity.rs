//! Caller identity, resolved once at the HTTP boundary.
//!
//! The upstream gateway forwards the authenticated user in `X-User-Id`.
//! Business logic only ever sees a numeric id.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
const ADMIN_IDENTITY: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub is_admin: bool,
}

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Maps a raw identity to a user id: `admin` resolves to the configured
/// admin id, anything else must be a positive integer.
pub fn resolve_user_id(raw: &str, admin_user_id: i64) -> Option<i64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(ADMIN_IDENTITY) {
        return Some(admin_user_id);
    }
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let admin_user_id = state.config.admin_user_id;

        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let id = resolve_user_id(raw, admin_user_id).ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            id,
            is_admin: id == admin_user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_literal_resolves_to_configured_id() {
        assert_eq!(resolve_user_id("admin", 7), Some(7));
        assert_eq!(resolve_user_id(" ADMIN ", 7), Some(7));
    }

    #[test]
    fn test_numeric_ids() {
        assert_eq!(resolve_user_id("42", 1), Some(42));
        assert_eq!(resolve_user_id("0", 1), None);
        assert_eq!(resolve_user_id("-3", 1), None);
        assert_eq!(resolve_user_id("alice", 1), None);
        assert_eq!(resolve_user_id("", 1), None);
    }

    #[test]
    fn test_require_admin() {
        let admin = CurrentUser { id: 1, is_admin: true };
        let user = CurrentUser { id: 2, is_admin: false };
        assert!(admin.require_admin().is_ok());
        assert!(matches!(user.require_admin(), Err(AppError::Forbidden)));
    }
}
