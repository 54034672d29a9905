#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Focus type of a residency exam: entry-level (R1), one of the
/// specialty-track "R+" exams, or a practical/theoretical/complementary stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum ExamFocus {
    #[serde(rename = "R1")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "R1"))]
    R1,
    #[serde(rename = "R+ CIRURGIA GERAL")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "R+ CIRURGIA GERAL"))]
    GeneralSurgery,
    #[serde(rename = "R+ CLÍNICA MÉDICA")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "R+ CLÍNICA MÉDICA"))]
    InternalMedicine,
    #[serde(rename = "R+ GINECOLOGIA E OBSTETRÍCIA")]
    #[cfg_attr(
        feature = "sea-orm",
        sea_orm(string_value = "R+ GINECOLOGIA E OBSTETRÍCIA")
    )]
    ObstetricsGynecology,
    #[serde(rename = "R+ PEDIATRIA")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "R+ PEDIATRIA"))]
    Pediatrics,
    #[serde(rename = "PROVA PRÁTICA")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PROVA PRÁTICA"))]
    Practical,
    #[serde(rename = "PROVA TEÓRICA")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PROVA TEÓRICA"))]
    Theoretical,
    #[serde(rename = "PROVA COMPLEMENTAR")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PROVA COMPLEMENTAR"))]
    Complementary,
}

impl ExamFocus {
    pub const ALL: &'static [ExamFocus] = &[
        Self::R1,
        Self::GeneralSurgery,
        Self::InternalMedicine,
        Self::ObstetricsGynecology,
        Self::Pediatrics,
        Self::Practical,
        Self::Theoretical,
        Self::Complementary,
    ];

    /// Label as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::R1 => "R1",
            Self::GeneralSurgery => "R+ CIRURGIA GERAL",
            Self::InternalMedicine => "R+ CLÍNICA MÉDICA",
            Self::ObstetricsGynecology => "R+ GINECOLOGIA E OBSTETRÍCIA",
            Self::Pediatrics => "R+ PEDIATRIA",
            Self::Practical => "PROVA PRÁTICA",
            Self::Theoretical => "PROVA TEÓRICA",
            Self::Complementary => "PROVA COMPLEMENTAR",
        }
    }
}

impl fmt::Display for ExamFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown focus label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseExamFocusError {
    invalid: String,
}

impl fmt::Display for ParseExamFocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid exam focus '{}'. Valid values: {}",
            self.invalid,
            ExamFocus::ALL
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseExamFocusError {}

impl FromStr for ExamFocus {
    type Err = ParseExamFocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s.trim())
            .ok_or(ParseExamFocusError {
                invalid: s.to_string(),
            })
    }
}
