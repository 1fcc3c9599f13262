//! Cached filesystem items
//!
//! The remote store only knows themes and flat-keyed assets. Everything that
//! looks like a directory below a theme is synthesized from asset keys.

use chrono::{DateTime, Utc};

use crate::gateway::types::{AssetRecord, ThemeRecord};
use crate::path;

/// Timestamp as received (ISO-8601 text) or already parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Text(String),
    At(DateTime<Utc>),
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Timestamp::Text(value)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp::At(value)
    }
}

/// A theme, shown as a top-level directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub id: u64,
    /// Name with `/` replaced, safe to use as a path segment
    pub name: String,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl From<ThemeRecord> for Theme {
    fn from(record: ThemeRecord) -> Self {
        Self {
            id: record.id,
            name: path::sanitize_theme_name(&record.name),
            created_at: record.created_at.map(Timestamp::from),
            updated_at: record.updated_at.map(Timestamp::from),
        }
    }
}

/// Where an asset's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    /// Publicly served copy, fetched without credentials
    External(String),
    /// Must be fetched by key from the API
    ByKey,
}

/// A theme asset, shown as a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub key: String,
    /// Final segment of the key
    pub name: String,
    pub size: u64,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub content: ContentLocation,
}

impl From<AssetRecord> for Asset {
    fn from(record: AssetRecord) -> Self {
        let name = path::leaf_name(&record.key).to_string();
        Self {
            name,
            size: record.size.unwrap_or(0),
            created_at: record.created_at.map(Timestamp::from),
            updated_at: record.updated_at.map(Timestamp::from),
            content: match record.public_url {
                Some(url) if !url.is_empty() => ContentLocation::External(url),
                _ => ContentLocation::ByKey,
            },
            key: record.key,
        }
    }
}

/// Intermediate path segment with no remote counterpart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub name: String,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Directory {
    /// The `/` entry
    pub fn root() -> Self {
        Self { name: String::new(), created_at: None, updated_at: None }
    }

    /// Directory below `theme`, inheriting the theme's timestamps
    pub fn within(theme: &Theme, name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: theme.created_at.clone(),
            updated_at: theme.updated_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Theme(Theme),
    Asset(Asset),
    Directory(Directory),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Theme(theme) => &theme.name,
            Item::Asset(asset) => &asset.name,
            Item::Directory(dir) => &dir.name,
        }
    }

    pub fn is_dir(&self) -> bool {
        match self {
            Item::Theme(_) | Item::Directory(_) => true,
            Item::Asset(_) => false,
        }
    }

    pub fn as_theme(&self) -> Option<&Theme> {
        match self {
            Item::Theme(theme) => Some(theme),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Item::Asset(asset) => Some(asset),
            _ => None,
        }
    }
}
