//! Wire shapes as returned by the remote API.
//!
//! Every field is optional on decode; the store decides which records are
//! complete enough to persist.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiHero {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Maps to the domain `info` field
    pub description: Option<String>,
    pub photo: Option<String>,
    pub favorite: Option<bool>,
}

impl ApiHero {
    /// A bare reference carrying only the hero id, as embedded in child payloads.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiLocation {
    pub id: Option<String>,
    #[serde(rename = "dateShow")]
    pub date: Option<String>,
    #[serde(rename = "latitud")]
    pub latitude: Option<String>,
    #[serde(rename = "longitud")]
    pub longitude: Option<String>,
    pub hero: Option<ApiHero>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiTransformation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub hero: Option<ApiHero>,
}

/// Returns the trimmed value when present and non-blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ApiLocation {
    pub(crate) fn hero_id(&self) -> Option<&str> {
        self.hero.as_ref().and_then(|h| present(&h.id))
    }
}

impl ApiTransformation {
    pub(crate) fn hero_id(&self) -> Option<&str> {
        self.hero.as_ref().and_then(|h| present(&h.id))
    }
}
