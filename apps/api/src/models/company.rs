use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Public projection of a company. The password hash never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Logo URL in object storage.
    pub image: String,
}

/// A company together with its password hash. Only used for login.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyCredentials {
    #[sqlx(flatten)]
    pub company: Company,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    pub image: String,
    pub password_hash: String,
}
