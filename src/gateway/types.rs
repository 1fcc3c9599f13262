//! Wire records of the remote theme API
//!
//! Only the fields the adapter reads are modeled; everything else in the
//! response bodies is ignored.

use serde::{Deserialize, Serialize};

use crate::error::FsError;

/// `GET /admin/themes` -> `{ "themes": [...] }`
#[derive(Debug, Deserialize)]
pub struct ThemeList {
    pub themes: Vec<ThemeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// `GET /admin/themes/{id}/assets` -> `{ "assets": [...] }`
#[derive(Debug, Deserialize)]
pub struct AssetList {
    pub assets: Vec<AssetRecord>,
}

/// Asset metadata as listed (no content)
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRecord {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Single-asset envelope returned by keyed GET and by PUT
#[derive(Debug, Deserialize)]
pub struct AssetEnvelope<T> {
    pub asset: T,
}

/// Asset content as returned by a keyed GET: either inline text or a
/// base64 attachment
#[derive(Debug, Deserialize)]
pub struct AssetContent {
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Body of an asset PUT
#[derive(Debug, Serialize)]
pub struct AssetUpdate<'a> {
    pub asset: AssetUpdateFields<'a>,
}

#[derive(Debug, Serialize)]
pub struct AssetUpdateFields<'a> {
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_key: Option<&'a str>,
}

impl<'a> AssetUpdate<'a> {
    /// Create or overwrite `key` with raw bytes
    pub fn attachment(key: &'a str, base64_data: String) -> Self {
        Self {
            asset: AssetUpdateFields { key, attachment: Some(base64_data), source_key: None },
        }
    }

    /// Server-side copy of `source_key` to `key`
    pub fn copy(source_key: &'a str, key: &'a str) -> Self {
        Self {
            asset: AssetUpdateFields { key, attachment: None, source_key: Some(source_key) },
        }
    }
}

/// Decode a JSON body into a wire record
pub fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value, what: &str) -> Result<T, FsError> {
    serde_json::from_value(body).map_err(|e| FsError::ParseError(format!("Unexpected {} body: {}", what, e)))
}
