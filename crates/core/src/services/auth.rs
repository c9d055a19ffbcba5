//! Bearer-token authorization for administrative actions.
//!
//! Identity resolution and the admin rule are separate seams: an
//! [`IdentityProvider`] turns a token into an [`Identity`], and an
//! [`Authorizer`] decides whether that identity may act.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use satya_common::{AppError, AppResult, config::normalize_emails};
use serde::Deserialize;

/// Role name granting admin rights.
pub const ADMIN_ROLE: &str = "admin";

/// A resolved caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user id (`sub`).
    pub user_id: String,
    /// Email address, if the provider shares one.
    pub email: Option<String>,
    /// Role claims.
    pub roles: Vec<String>,
}

/// Result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub authorized: bool,
    pub identity: Identity,
}

/// Resolves a bearer credential into an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fails with [`AppError::Unauthorized`] if the credential is not valid.
    async fn resolve(&self, credential: &str) -> AppResult<Identity>;
}

/// Decides whether a bearer credential may perform admin actions.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Fails with [`AppError::Unauthorized`] for a missing or invalid
    /// credential; otherwise reports whether the identity is authorized.
    async fn authorize(&self, credential: &str) -> AppResult<Authorization>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

impl RoleClaim {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(role) => vec![role],
            Self::Many(roles) => roles,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    #[serde(default)]
    role: Option<RoleClaim>,
    #[serde(default)]
    roles: Option<RoleClaim>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: Option<AppMetadata>,
}

/// Identity provider backed by HS256-signed JWT access tokens.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    /// Create a provider verifying tokens with `secret`.
    ///
    /// When `audience` is set the `aud` claim must match it.
    #[must_use]
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, credential: &str) -> AppResult<Identity> {
        let data = decode::<Claims>(credential, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("invalid token".to_string())
        })?;

        let claims = data.claims;
        let metadata = claims.app_metadata.unwrap_or_default();
        let mut roles = Vec::new();
        for claim in [metadata.role, metadata.roles].into_iter().flatten() {
            roles.extend(claim.into_vec());
        }

        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
            roles,
        })
    }
}

/// Grants admin rights by role claim or by email allow-list.
#[derive(Clone)]
pub struct AdminPolicy {
    provider: Arc<dyn IdentityProvider>,
    admin_emails: Vec<String>,
}

impl AdminPolicy {
    /// Create a policy over `provider`. Emails are compared case-insensitively.
    #[must_use]
    pub fn new<I, S>(provider: Arc<dyn IdentityProvider>, admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            provider,
            admin_emails: normalize_emails(admin_emails),
        }
    }

    /// Whether `identity` is an admin under this policy.
    #[must_use]
    pub fn is_admin(&self, identity: &Identity) -> bool {
        if identity.roles.iter().any(|r| r == ADMIN_ROLE) {
            return true;
        }

        identity.email.as_deref().is_some_and(|email| {
            let email = email.trim().to_lowercase();
            self.admin_emails.iter().any(|allowed| *allowed == email)
        })
    }
}

#[async_trait]
impl Authorizer for AdminPolicy {
    async fn authorize(&self, credential: &str) -> AppResult<Authorization> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AppError::Unauthorized("missing bearer token".to_string()));
        }

        let identity = self.provider.resolve(credential).await?;
        Ok(Authorization {
            authorized: self.is_admin(&identity),
            identity,
        })
    }
}
