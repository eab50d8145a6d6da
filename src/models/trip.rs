use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DefaultOnNull};
use url::Url;

/// A trip document as it lives in the store.
///
/// Field names follow the camelCase keys of the stored documents. Every field
/// decodes leniently so that a hand-edited record never yields an invalid
/// roster.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub passphrase: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub participants: Vec<TripParticipant>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub links: Vec<TripLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripParticipant {
    pub name: String,
    /// Total seats offered, driver included. Zero means not driving.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub driver: u32,
    #[serde(default)]
    pub driving_with: String,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub brings: Vec<String>,
}

impl TripParticipant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_driver(&self) -> bool {
        self.driver > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLink {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub href: String,
}

impl TripLink {
    /// The href, if it is an absolute http(s) URL safe to render as an anchor.
    pub fn safe_href(&self) -> Option<&str> {
        let url = Url::parse(&self.href).ok()?;
        match url.scheme() {
            "http" | "https" => Some(self.href.as_str()),
            _ => None,
        }
    }

    pub fn title_text(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.href
        } else {
            &self.title
        }
    }
}
