//! Company registration, login and profile.

use axum::{
    extract::multipart::{Multipart, MultipartRejection},
    extract::rejection::JsonRejection,
    extract::State,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Authenticated, CompanyActor};
use crate::errors::AppError;
use crate::models::company::{Company, NewCompany};
use crate::state::AppState;
use crate::storage::StagedUpload;
use crate::store::StoreError;

const COMPANY_EXISTS: &str = "Company Already Exists";
const LOGO_PREFIX: &str = "logos";

/// Uploaded logo as received from the multipart body.
pub struct LogoFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Fields of the multipart registration form.
#[derive(Default)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<LogoFile>,
}

impl RegisterForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = RegisterForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("name") => form.name = Some(field.text().await?),
                Some("email") => form.email = Some(field.text().await?),
                Some("password") => form.password = Some(field.text().await?),
                Some("image") => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    form.image = Some(LogoFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

/// Creates a company account: duplicate check, password hash, logo upload, insert.
pub async fn register_company(state: &AppState, form: RegisterForm) -> Result<Company, AppError> {
    let text = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(name), Some(email), Some(password), Some(image)) = (
        text(form.name),
        text(form.email),
        form.password.filter(|p| !p.is_empty()),
        form.image.filter(|f| !f.data.is_empty()),
    ) else {
        return Err(AppError::Validation("Missing Details".to_string()));
    };

    if state.store.find_company_credentials(&email).await?.is_some() {
        return Err(AppError::AlreadyExists(COMPANY_EXISTS.to_string()));
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let staged = StagedUpload::stage(image.file_name, image.content_type, image.data).await?;
    let image_url = staged
        .upload(state.objects.as_ref(), LOGO_PREFIX, state.upload_timeout())
        .await?;

    let company = state
        .store
        .insert_company(NewCompany {
            name,
            email,
            image: image_url,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration of the same email.
            StoreError::Conflict(_) => AppError::AlreadyExists(COMPANY_EXISTS.to_string()),
            other => AppError::Store(other),
        })?;

    info!("Registered company {} <{}>", company.id, company.email);
    Ok(company)
}

/// POST /api/company/register
pub async fn handle_register(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let form = RegisterForm::read(multipart?).await?;
    let company = register_company(&state, form).await?;
    let token = state.tokens.issue(company.id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Registered Successfully",
        "company": company,
        "token": token,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Checks credentials. Unknown email and wrong password fail identically.
pub async fn login_company(state: &AppState, req: LoginRequest) -> Result<Company, AppError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Missing Details".to_string()));
    }

    let credentials = state
        .store
        .find_company_credentials(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let password = req.password;
    let stored = credentials.password_hash;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    if !matches {
        return Err(AppError::InvalidCredentials);
    }
    Ok(credentials.company)
}

/// POST /api/company/login
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = body?;
    let company = login_company(&state, req).await?;
    let token = state.tokens.issue(company.id)?;
    info!("Company {} logged in", company.id);
    Ok(Json(json!({
        "success": true,
        "message": "Logged in Successfully",
        "company": company,
        "token": token,
    })))
}

/// GET /api/company/company
pub async fn handle_get_company(
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
) -> Json<Value> {
    Json(json!({ "success": true, "company": company }))
}
