//! Identity extractors.
//!
//! The storefront never authenticates users itself. An upstream identity
//! proxy verifies the session and forwards the result in trusted headers:
//!
//! - `x-auth-email` - Verified email address of the caller
//! - `x-auth-name` - Display name (optional)
//! - `x-auth-groups` - Comma-separated group claims; `ADMINS` grants admin
//!
//! Requests that reach the storefront without passing through the proxy must
//! not be able to set these headers; that is a deployment concern.

use axum::{extract::FromRequestParts, http::request::Parts};

use filament_shop_core::{Email, Role};

use crate::error::{AppError, set_sentry_user};

/// Header carrying the verified caller email.
pub const AUTH_EMAIL_HEADER: &str = "x-auth-email";
/// Header carrying the caller display name.
pub const AUTH_NAME_HEADER: &str = "x-auth-name";
/// Header carrying the caller's group claims.
pub const AUTH_GROUPS_HEADER: &str = "x-auth-groups";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: Email,
    pub name: Option<String>,
    pub role: Role,
}

impl Identity {
    /// Read the identity headers. `None` if absent or malformed.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let email = Email::parse(header(AUTH_EMAIL_HEADER)?).ok()?;
        let name = header(AUTH_NAME_HEADER).map(str::to_owned);
        let role = Role::from_groups(
            header(AUTH_GROUPS_HEADER)
                .unwrap_or_default()
                .split(',')
                .map(str::trim),
        );

        Some(Self { email, name, role })
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(identity): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", identity.email)
/// }
/// ```
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_parts(parts)
            .ok_or_else(|| AppError::Unauthorized("sign-in required".to_string()))?;
        set_sentry_user(identity.email.as_str());
        Ok(Self(identity))
    }
}

/// Extractor that requires a caller in the `ADMINS` group.
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            tracing::warn!(email = %identity.email, path = %parts.uri.path(), "admin route denied");
            return Err(AppError::Forbidden("admin access required".to_string()));
        }
        Ok(Self(identity))
    }
}

/// Extractor that optionally gets the caller.
///
/// Unlike `RequireAuth`, this does not reject guests.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Identity::from_parts(parts)))
    }
}
