use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job seeker. `id` is issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
    pub resume: Option<String>,
}
