//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation id, propagated or generated
//! - [`AuthenticatedUser`]: caller identity set by the upstream authenticator
//! - [`AdminUser`]: an [`AuthenticatedUser`] whose role is `admin`
//!
//! Authentication happens before requests reach this service. The
//! authenticator forwards the verified identity in [`USER_ID_HEADER`] and
//! [`USER_ROLE_HEADER`]; these extractors only read them.

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use boxoffice_core::UserId;
use uuid::Uuid;

/// Header carrying the verified user id (a UUID).
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the verified user role.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Correlation ID for request tracing.
///
/// Prefers the id stored by
/// [`correlation_id_layer`](crate::middleware::correlation_id_layer), then
/// the `X-Correlation-ID` header, and generates a new one otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Role granted by the authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular customer
    User,
    /// Box office staff
    Admin,
}

impl Role {
    fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(role) if role.eq_ignore_ascii_case("admin") => Self::Admin,
            _ => Self::User,
        }
    }
}

/// The caller, as identified upstream.
///
/// Rejects with 401 when the id header is missing or not a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Verified user id
    pub user_id: UserId,
    /// Granted role
    pub role: Role,
}

impl AuthenticatedUser {
    /// Whether the caller may use admin routes.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let user_id = raw
            .trim()
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized("Invalid user identity"))?;

        let role = Role::from_header(
            parts
                .headers
                .get(USER_ROLE_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        Ok(Self { user_id, role })
    }
}

/// An authenticated caller with the admin role.
///
/// Rejects with 401 without identity and 403 for non-admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = %user.user_id, "Admin route refused");
            Err(AppError::forbidden("Admin access required"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let mut parts = parts(&[(CORRELATION_ID_HEADER, uuid.to_string().as_str())]);
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_generates_new() {
        let mut parts = parts(&[]);
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_ne!(correlation_id.0, Uuid::nil());
    }

    #[tokio::test]
    async fn test_authenticated_user_from_headers() {
        let id = UserId::new();
        let mut parts = parts(&[(USER_ID_HEADER, id.to_string().as_str())]);
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(user.user_id, id);
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let mut parts = parts(&[]);
        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let mut parts = parts_with_bad_id();
        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    fn parts_with_bad_id() -> Parts {
        parts(&[(USER_ID_HEADER, "not-a-uuid")])
    }

    #[tokio::test]
    async fn test_admin_requires_role() {
        let id = UserId::new().to_string();

        let mut user = parts(&[(USER_ID_HEADER, id.as_str()), (USER_ROLE_HEADER, "user")]);
        let err = AdminUser::from_request_parts(&mut user, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let mut admin = parts(&[(USER_ID_HEADER, id.as_str()), (USER_ROLE_HEADER, "Admin")]);
        let admin = AdminUser::from_request_parts(&mut admin, &()).await.unwrap();
        assert!(admin.0.is_admin());
    }
}
