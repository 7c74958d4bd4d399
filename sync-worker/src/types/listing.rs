//! Listing domain types shared by the pipeline components

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What a queue message asks the worker to do
///
/// Parsed from the `action` message attribute. Adding a variant forces every
/// dispatch site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Action {
    /// Create the listing on the marketplace and record it
    #[strum(serialize = "upload")]
    Publish,
    /// Delete a previously published listing
    #[strum(serialize = "remove")]
    Withdraw,
}

/// Marketplace account credentials carried by a message
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity of a local ad in the sync record table
///
/// Ads are currently keyed by title, which assumes titles are unique within the
/// inventory. Everything downstream only sees this opaque key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingKey(String);

impl ListingKey {
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        Self(title.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier the marketplace assigned to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub i64);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExternalId {
    type Err = std::num::ParseIntError;

    /// Parses a bare decimal integer, ignoring surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Publish payload of an `upload` message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    /// Price in minor currency units
    #[serde(rename = "price")]
    pub price_minor: i64,
    #[serde(rename = "category-id")]
    pub category_id: i64,
    /// Object store keys, in marketplace slot order
    #[serde(rename = "images", default)]
    pub image_refs: Vec<String>,
}

impl AdDraft {
    #[must_use]
    pub fn listing_key(&self) -> ListingKey {
        ListingKey::from_title(&self.title)
    }
}

/// Image bytes for one entry of `AdDraft::image_refs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub image_ref: String,
    pub bytes: Vec<u8>,
}

/// A listing the marketplace accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketplaceListing {
    pub external_id: ExternalId,
    pub published_at: DateTime<Utc>,
}

/// A fully decoded unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    Publish(AdDraft),
    Withdraw(ExternalId),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(Action::from_str("upload"), Ok(Action::Publish));
        assert_eq!(Action::from_str("remove"), Ok(Action::Withdraw));
        assert!(Action::from_str("Upload").is_err());
        assert_eq!(Action::Publish.to_string(), "upload");
    }

    #[test]
    fn test_ad_draft_uses_wire_field_names() {
        let draft: AdDraft = serde_json::from_str(
            r#"{"title":"Bike","description":"Red","price":50,"category-id":12,"images":["img/1.png","img/2.png"]}"#,
        )
        .unwrap();

        assert_eq!(
            draft,
            AdDraft {
                title: "Bike".to_string(),
                description: "Red".to_string(),
                price_minor: 50,
                category_id: 12,
                image_refs: vec!["img/1.png".to_string(), "img/2.png".to_string()],
            }
        );
        assert_eq!(draft.listing_key().as_str(), "Bike");
    }

    #[test]
    fn test_external_id_parsing() {
        assert_eq!("987".parse::<ExternalId>(), Ok(ExternalId(987)));
        assert_eq!(" 987\n".parse::<ExternalId>(), Ok(ExternalId(987)));
        assert!("98x".parse::<ExternalId>().is_err());
        assert!("".parse::<ExternalId>().is_err());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            username: "u".to_string(),
            password: "hunter2".to_string(),
        };

        let debug = format!("{credentials:?}");
        assert!(debug.contains("\"u\""));
        assert!(!debug.contains("hunter2"));
    }
}
