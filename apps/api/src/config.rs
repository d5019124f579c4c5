use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// How strictly company-scoped mutations check that the caller owns the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipPolicy {
    /// Every mutation verifies ownership and rejects foreign records.
    #[default]
    Strict,
    /// Legacy behavior: visibility toggles silently no-op for non-owners and
    /// status changes are unchecked.
    Compat,
}

impl FromStr for OwnershipPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(OwnershipPolicy::Strict),
            "compat" => Ok(OwnershipPolicy::Compat),
            other => Err(anyhow!(
                "OWNERSHIP_POLICY must be 'strict' or 'compat', got '{other}'"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// PEM public key of the identity provider, used to verify user session tokens.
    pub identity_jwt_key: String,
    /// `whsec_`-prefixed signing secret for identity provider webhooks.
    pub identity_webhook_secret: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL under which uploaded objects are publicly reachable.
    pub s3_public_url: String,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub ai_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub ownership_policy: OwnershipPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            jwt_secret: require_env("JWT_SECRET")?,
            identity_jwt_key: require_env("IDENTITY_JWT_KEY")?,
            identity_webhook_secret: require_env("IDENTITY_WEBHOOK_SECRET")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_public_url: require_env("S3_PUBLIC_URL")?,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            ai_timeout_secs: parse_env("AI_TIMEOUT_SECS", 60)?,
            upload_timeout_secs: parse_env("UPLOAD_TIMEOUT_SECS", 30)?,
            ownership_policy: match std::env::var("OWNERSHIP_POLICY") {
                Ok(v) => v.parse()?,
                Err(_) => OwnershipPolicy::default(),
            },
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-crate tests. No variable is read from the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            identity_jwt_key: String::new(),
            identity_webhook_secret: "whsec_dGVzdC13ZWJob29rLXNlY3JldA==".to_string(),
            s3_bucket: "test-bucket".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_public_url: "http://localhost:9000/test-bucket".to_string(),
            aws_region: "us-east-1".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            ai_timeout_secs: 5,
            upload_timeout_secs: 5,
            ownership_policy: OwnershipPolicy::Strict,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
