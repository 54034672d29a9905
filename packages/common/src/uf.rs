#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Brazilian federative unit an institution or exam belongs to.
/// `BRASIL` marks nationwide exams.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Uf {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "AC"))]
    Ac,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "AL"))]
    Al,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "AP"))]
    Ap,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "AM"))]
    Am,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "BA"))]
    Ba,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CE"))]
    Ce,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DF"))]
    Df,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ES"))]
    Es,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "GO"))]
    Go,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MA"))]
    Ma,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MT"))]
    Mt,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MS"))]
    Ms,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MG"))]
    Mg,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PA"))]
    Pa,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PB"))]
    Pb,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PR"))]
    Pr,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PE"))]
    Pe,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PI"))]
    Pi,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RJ"))]
    Rj,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RN"))]
    Rn,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RS"))]
    Rs,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RO"))]
    Ro,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RR"))]
    Rr,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SC"))]
    Sc,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SP"))]
    Sp,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SE"))]
    Se,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "TO"))]
    To,
    /// Nationwide.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "BRASIL"))]
    Brasil,
}

impl Uf {
    /// All values, in the order forms present them.
    pub const ALL: &'static [Uf] = &[
        Self::Ac,
        Self::Al,
        Self::Ap,
        Self::Am,
        Self::Ba,
        Self::Ce,
        Self::Df,
        Self::Es,
        Self::Go,
        Self::Ma,
        Self::Mt,
        Self::Ms,
        Self::Mg,
        Self::Pa,
        Self::Pb,
        Self::Pr,
        Self::Pe,
        Self::Pi,
        Self::Rj,
        Self::Rn,
        Self::Rs,
        Self::Ro,
        Self::Rr,
        Self::Sc,
        Self::Sp,
        Self::Se,
        Self::To,
        Self::Brasil,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::Al => "AL",
            Self::Ap => "AP",
            Self::Am => "AM",
            Self::Ba => "BA",
            Self::Ce => "CE",
            Self::Df => "DF",
            Self::Es => "ES",
            Self::Go => "GO",
            Self::Ma => "MA",
            Self::Mt => "MT",
            Self::Ms => "MS",
            Self::Mg => "MG",
            Self::Pa => "PA",
            Self::Pb => "PB",
            Self::Pr => "PR",
            Self::Pe => "PE",
            Self::Pi => "PI",
            Self::Rj => "RJ",
            Self::Rn => "RN",
            Self::Rs => "RS",
            Self::Ro => "RO",
            Self::Rr => "RR",
            Self::Sc => "SC",
            Self::Sp => "SP",
            Self::Se => "SE",
            Self::To => "TO",
            Self::Brasil => "BRASIL",
        }
    }
}

impl fmt::Display for Uf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown UF code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUfError {
    invalid: String,
}

impl fmt::Display for ParseUfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid UF '{}'", self.invalid)
    }
}

impl std::error::Error for ParseUfError {}

impl FromStr for Uf {
    type Err = ParseUfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|uf| uf.as_str() == upper)
            .ok_or(ParseUfError {
                invalid: s.to_string(),
            })
    }
}
