//! Job-seeker sessions.
//!
//! User sessions are issued by the external identity provider. Verification is
//! the provider's concern; the service only consumes the verified user id and
//! trusts it for the rest of the request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::auth::{bearer_token, Actor};
use crate::errors::AppError;
use crate::state::AppState;

/// Verifies an identity-provider session token and returns the user id it names.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Networkless verification of RS256 session tokens against the provider's
/// published PEM public key.
pub struct PemIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl PemIdentityVerifier {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .context("IDENTITY_JWT_KEY is not a valid RSA public key in PEM format")?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_nbf = true;
        Ok(Self { key, validation })
    }
}

#[async_trait]
impl IdentityVerifier for PemIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;
        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthenticated);
        }
        Ok(data.claims.sub)
    }
}

/// The authenticated job seeker.
#[derive(Debug, Clone)]
pub struct UserActor {
    pub user_id: String,
}

#[async_trait]
impl Actor for UserActor {
    const KIND: &'static str = "user";

    async fn resolve(parts: &Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
        let user_id = state.identity.verify(token).await?;
        Ok(UserActor { user_id })
    }

    fn actor_id(&self) -> String {
        self.user_id.clone()
    }
}
