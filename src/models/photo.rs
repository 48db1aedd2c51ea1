use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::constants::UNSPLASH_SITE;

/// A photo as returned by the upstream list endpoint. Fields the proxy does
/// not read (`alt_description`, `blur_hash`, `links.download_location`, ...)
/// are kept in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
    pub user: PhotoUser,
    #[serde(default)]
    pub likes: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUser {
    #[serde(default)]
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub links: UserLinks,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-photo statistics with guaranteed-present counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhotoStatistics {
    pub views: u64,
    pub downloads: u64,
}

impl PhotoStatistics {
    /// Reads `views.total` and `downloads.total`, defaulting anything absent,
    /// null, negative or non-numeric to zero.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            views: total_of(value, "views"),
            downloads: total_of(value, "downloads"),
        }
    }
}

fn total_of(value: &Value, field: &str) -> u64 {
    let Some(total) = value.get(field).and_then(|v| v.get("total")) else {
        return 0;
    };

    match total {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// A listed photo merged with its statistics and attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedPhoto {
    pub id: String,
    pub urls: BTreeMap<String, String>,
    pub user: PhotoUser,
    pub likes: u64,
    pub total_likes: u64,
    pub total_views: u64,
    pub total_downloads: u64,
    pub attribution: String,
    pub credit_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys computed by the proxy; upstream values under these names are dropped.
const ENRICHED_KEYS: [&str; 5] = [
    "total_likes",
    "total_views",
    "total_downloads",
    "attribution",
    "credit_url",
];

impl EnrichedPhoto {
    #[must_use]
    pub fn new(photo: Photo, stats: PhotoStatistics, app_name: &str) -> Self {
        let attribution = attribution_for(&photo.user);
        let credit_url = credit_url_for(&photo.user, app_name);

        let mut extra = photo.extra;
        for key in ENRICHED_KEYS {
            extra.remove(key);
        }

        Self {
            id: photo.id,
            urls: photo.urls,
            user: photo.user,
            likes: photo.likes,
            total_likes: photo.likes,
            total_views: stats.views,
            total_downloads: stats.downloads,
            attribution,
            credit_url,
            extra,
        }
    }
}

#[must_use]
pub fn attribution_for(user: &PhotoUser) -> String {
    let name = if user.name.trim().is_empty() {
        user.username.as_str()
    } else {
        user.name.as_str()
    };
    format!("Photo by {name} on Unsplash")
}

/// Profile link with referral parameters. Falls back to the site profile URL
/// built from the username when upstream omits `links.html`.
#[must_use]
pub fn credit_url_for(user: &PhotoUser, app_name: &str) -> String {
    let profile = user
        .links
        .html
        .as_deref()
        .filter(|link| !link.trim().is_empty())
        .map_or_else(
            || format!("{UNSPLASH_SITE}/@{}", urlencoding::encode(&user.username)),
            str::to_string,
        );

    let separator = if profile.contains('?') { '&' } else { '?' };
    format!(
        "{profile}{separator}utm_source={}&utm_medium=referral",
        urlencoding::encode(app_name)
    )
}
