//! Company session tokens and the company guard.
//!
//! Tokens are HS256 JWTs whose only domain claim is the company id. They expire
//! a fixed 30 days after issuance; there is no refresh.

use async_trait::async_trait;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{bearer_token, Actor};
use crate::errors::AppError;
use crate::models::company::Company;
use crate::state::AppState;

pub const TOKEN_TTL_DAYS: i64 = 30;

/// Header carrying the company session token.
pub const TOKEN_HEADER: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyClaims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies company session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, company_id: Uuid) -> Result<String, AppError> {
        self.issue_at(company_id, Utc::now())
    }

    pub fn issue_at(&self, company_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = CompanyClaims {
            id: company_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
    }

    /// Verifies signature and expiry and returns the company id.
    /// The verifier's own message is surfaced on failure.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<CompanyClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;
        Uuid::parse_str(&data.claims.id)
            .map_err(|_| AppError::InvalidToken("Token does not identify a company".to_string()))
    }
}

/// The authenticated company, loaded without its password hash.
#[derive(Debug, Clone)]
pub struct CompanyActor(pub Company);

#[async_trait]
impl Actor for CompanyActor {
    const KIND: &'static str = "company";

    async fn resolve(parts: &Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| bearer_token(parts))
            .ok_or(AppError::Unauthenticated)?;

        let company_id = state.tokens.verify(token)?;
        let company = state
            .store
            .find_company(company_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        Ok(CompanyActor(company))
    }

    fn actor_id(&self) -> String {
        self.0.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies_to_same_company() {
        let tokens = TokenService::new("secret");
        let id = Uuid::new_v4();
        let token = tokens.issue(id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_token_older_than_thirty_days_is_rejected() {
        let tokens = TokenService::new("secret");
        let issued = Utc::now() - Duration::days(TOKEN_TTL_DAYS) - Duration::minutes(1);
        let token = tokens.issue_at(Uuid::new_v4(), issued).unwrap();
        match tokens.verify(&token) {
            Err(AppError::InvalidToken(msg)) => assert!(msg.contains("Expired"), "{msg}"),
            other => panic!("expected InvalidToken, got {other:?}"),
        }
    }

    #[test]
    fn test_token_just_inside_thirty_days_is_accepted() {
        let tokens = TokenService::new("secret");
        let issued = Utc::now() - Duration::days(TOKEN_TTL_DAYS) + Duration::minutes(5);
        let token = tokens.issue_at(Uuid::new_v4(), issued).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("other").issue(Uuid::new_v4()).unwrap();
        assert!(matches!(
            TokenService::new("secret").verify(&token),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            TokenService::new("secret").verify("not.a.jwt"),
            Err(AppError::InvalidToken(_))
        ));
    }
}
