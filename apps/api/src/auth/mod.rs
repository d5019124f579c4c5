//! Request authentication.
//!
//! The service has two disjoint kinds of principal: companies (recruiters), who
//! hold a session token issued by this service, and users (job seekers), whose
//! session is issued and verified by an external identity provider. Both are
//! modelled as an [`Actor`]; handlers ask for `Authenticated<CompanyActor>` or
//! `Authenticated<UserActor>` and never see which scheme resolved them.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

pub mod company;
pub mod password;
pub mod user;

pub use company::{CompanyActor, TokenService};
pub use user::{IdentityVerifier, PemIdentityVerifier, UserActor};

/// An authenticated request principal.
#[async_trait]
pub trait Actor: Sized + Send + Sync + 'static {
    /// Short label used in logs.
    const KIND: &'static str;

    /// Resolves the principal from request headers, or fails without running the handler.
    async fn resolve(parts: &Parts, state: &AppState) -> Result<Self, AppError>;

    fn actor_id(&self) -> String;
}

/// Extractor wrapping a resolved [`Actor`].
pub struct Authenticated<A>(pub A);

#[async_trait]
impl<A> FromRequestParts<AppState> for Authenticated<A>
where
    A: Actor,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match A::resolve(parts, state).await {
            Ok(actor) => {
                debug!(kind = A::KIND, id = %actor.actor_id(), "Request authenticated");
                Ok(Authenticated(actor))
            }
            Err(e) => {
                debug!(kind = A::KIND, path = %parts.uri.path(), "Authentication failed: {e}");
                Err(e)
            }
        }
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header, if any.
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
