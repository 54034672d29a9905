use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account email.
    #[schema(example = "admin@acervo.local")]
    pub email: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Identity of the signed-in account.
    pub user: MeResponse,
}

/// Identity of the signed-in account as shown in the header.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin@acervo.local")]
    pub email: String,
    /// Display name; the email local part when no profile exists.
    #[schema(example = "admin")]
    pub name: String,
    pub avatar_url: Option<String>,
}

impl MeResponse {
    pub fn new(
        id: i32,
        email: String,
        profile: Option<crate::entity::user_profile::Model>,
    ) -> Self {
        let (name, avatar_url) = match profile {
            Some(p) => (p.name.filter(|n| !n.trim().is_empty()), p.avatar_url),
            None => (None, None),
        };
        let name = name.unwrap_or_else(|| email_local_part(&email).to_string());
        Self {
            id,
            email,
            name,
            avatar_url,
        }
    }
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
