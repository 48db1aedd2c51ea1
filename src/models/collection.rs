use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::photo::PhotoUser;

/// A user collection, passed through to clients without enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_photos: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<CoverPhoto>,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PhotoUser>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverPhoto {
    pub id: String,
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
