use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity provider tag. Selects which authentication strategy handled
/// (or should handle) a signin, both at dispatch time and on the stored
/// user record.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    Default,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "provider")]
pub enum Provider {
    #[sea_orm(string_value = "local")]
    #[default]
    Local,
    #[sea_orm(string_value = "google")]
    Google,
    #[sea_orm(string_value = "supabase")]
    Supabase,
}

impl Provider {
    /// The lowercase identifier used in URLs and intermediary code lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
            Self::Supabase => "supabase",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProviderParseError;

impl std::str::FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(value: &str) -> Result<Provider, Self::Err> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Provider::Local),
            "google" => Ok(Provider::Google),
            "supabase" => Ok(Provider::Supabase),
            _ => Err(ProviderParseError),
        }
    }
}
