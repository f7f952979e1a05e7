use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::store::TransformationRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transformation {
    pub id: String,
    pub name: String,
    pub info: String,
    pub photo: String,
}

impl Transformation {
    /// Photo as a URL; `None` when empty or malformed
    pub fn photo_url(&self) -> Option<Url> {
        let raw = self.photo.trim();
        if raw.is_empty() {
            return None;
        }
        Url::parse(raw).ok()
    }
}

impl From<TransformationRecord> for Transformation {
    fn from(record: TransformationRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            info: record.info,
            photo: record.photo,
        }
    }
}
