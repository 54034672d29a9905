use std::str::FromStr;

use common::{ExamFocus, Uf};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Page size used by list endpoints when `per_page` is not given.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Trim `value` and require 1..=`max` characters.
pub fn required_text(value: &str, label: &str, max: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{label} is required")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn parse_uf(value: &str) -> Result<Uf, AppError> {
    Uf::from_str(value).map_err(|e| AppError::Validation(e.to_string()))
}

pub fn parse_focus(value: &str) -> Result<ExamFocus, AppError> {
    ExamFocus::from_str(value).map_err(|e| AppError::Validation(e.to_string()))
}
