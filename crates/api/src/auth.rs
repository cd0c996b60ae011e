//! Header-based caller identity.
//!
//! The platform's edge proxy authenticates users and forwards the
//! verified identity in `x-user-id` and `x-user-role`. This service
//! trusts those headers; it is never exposed directly to the internet.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

/// Role forwarded by the edge proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// Authenticated caller, extracted from request headers.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    /// Returns true if the caller has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Errors unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))?;
        let user_id = uuid::Uuid::parse_str(user_id)
            .map(UserId::from_uuid)
            .map_err(|e| ApiError::Unauthorized(format!("invalid x-user-id header: {e}")))?;

        let role = match parts.headers.get("x-user-role").map(|v| v.to_str()) {
            None => Role::Customer,
            Some(Ok("customer")) => Role::Customer,
            Some(Ok("admin")) => Role::Admin,
            Some(_) => {
                return Err(ApiError::Unauthorized(
                    "unknown x-user-role header".to_string(),
                ));
            }
        };

        Ok(Identity { user_id, role })
    }
}
