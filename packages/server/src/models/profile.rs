use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Editable account profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "maria")]
    pub username: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    /// `None` until the profile is first saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileResponse {
    /// Profile of an account that has never saved one.
    pub fn empty(id: i32) -> Self {
        Self {
            id,
            username: None,
            website: None,
            avatar_url: None,
            updated_at: None,
        }
    }
}

impl From<crate::entity::profile::Model> for ProfileResponse {
    fn from(m: crate::entity::profile::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            website: m.website,
            avatar_url: m.avatar_url,
            updated_at: Some(m.updated_at),
        }
    }
}

/// Full replacement of the caller's profile. Absent or blank fields are
/// stored as NULL.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile values after trimming and validation.
pub struct ProfileValues {
    pub username: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_update_profile(req: UpdateProfileRequest) -> Result<ProfileValues, AppError> {
    let username = trimmed(req.username);
    if let Some(ref name) = username
        && !(3..=32).contains(&name.chars().count())
    {
        return Err(AppError::Validation(
            "Username must be 3-32 characters".into(),
        ));
    }
    let website = trimmed(req.website);
    if let Some(ref site) = website
        && site.len() > 2048
    {
        return Err(AppError::Validation("Website is too long".into()));
    }
    Ok(ProfileValues {
        username,
        website,
        avatar_url: trimmed(req.avatar_url),
    })
}
