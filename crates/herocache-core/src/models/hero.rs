use serde::{Deserialize, Serialize};

use crate::store::HeroRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub info: String,
    pub photo: String,
    pub favorite: bool,
}

impl From<HeroRecord> for Hero {
    fn from(record: HeroRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            info: record.info,
            photo: record.photo,
            favorite: record.favorite,
        }
    }
}
