//! In-memory gateway for tests
//!
//! Behaves like the remote theme API for the requests the adapter issues and
//! records each of them, so tests can assert on request shape and count.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use crate::error::FsError;
use crate::gateway::{ApiRequest, Gateway, Method, ASSET_KEY_PARAM, THEMES_RESOURCE};

const STUB_TIME: &str = "2024-05-01T12:00:00Z";

#[derive(Debug, Clone)]
enum StubContent {
    Value(String),
    Attachment(String),
}

#[derive(Debug, Clone)]
struct StubAsset {
    content: StubContent,
    public_url: Option<String>,
}

impl StubAsset {
    fn size(&self) -> usize {
        match &self.content {
            StubContent::Value(text) => text.len(),
            StubContent::Attachment(b64) => base64::engine::general_purpose::STANDARD
                .decode(b64)
                .map(|b| b.len())
                .unwrap_or(0),
        }
    }

    fn record(&self, key: &str) -> Value {
        let mut record = json!({
            "key": key,
            "size": self.size(),
            "created_at": STUB_TIME,
            "updated_at": STUB_TIME,
        });
        if let Some(ref url) = self.public_url {
            record["public_url"] = json!(url);
        }
        record
    }
}

#[derive(Debug)]
struct StubTheme {
    id: u64,
    name: String,
    created_at: String,
    updated_at: String,
    assets: BTreeMap<String, StubAsset>,
}

#[derive(Default)]
struct Inner {
    themes: Vec<StubTheme>,
    external: HashMap<String, Vec<u8>>,
    calls: Vec<ApiRequest>,
    fetches: Vec<String>,
    failures: Vec<(Method, FsError)>,
}

impl Inner {
    fn theme_mut(&mut self, id: u64) -> Option<&mut StubTheme> {
        self.themes.iter_mut().find(|t| t.id == id)
    }
}

#[derive(Default)]
pub struct StubGateway {
    inner: Mutex<Inner>,
}

fn not_found(resource: &str) -> FsError {
    FsError::HttpStatus { status: 404, resource: resource.to_string() }
}

/// `/admin/themes/{id}/assets` -> `id`
fn theme_id_of(resource: &str) -> Option<u64> {
    resource
        .strip_prefix("/admin/themes/")?
        .strip_suffix("/assets")?
        .parse()
        .ok()
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_theme(&self, id: u64, name: &str) {
        self.add_theme_with_times(id, name, STUB_TIME, STUB_TIME);
    }

    pub fn add_theme_with_times(&self, id: u64, name: &str, created_at: &str, updated_at: &str) {
        self.inner.lock().unwrap().themes.push(StubTheme {
            id,
            name: name.to_string(),
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
            assets: BTreeMap::new(),
        });
    }

    /// Text asset, served back as an inline `value`
    pub fn add_asset(&self, theme_id: u64, key: &str, text: &str) {
        self.insert(theme_id, key, StubAsset { content: StubContent::Value(text.to_string()), public_url: None });
    }

    /// Binary asset, served back as a base64 `attachment`
    pub fn add_binary_asset(&self, theme_id: u64, key: &str, bytes: &[u8]) {
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.insert(theme_id, key, StubAsset { content: StubContent::Attachment(b64), public_url: None });
    }

    /// Asset with a public copy at `url`
    pub fn add_external_asset(&self, theme_id: u64, key: &str, url: &str, bytes: &[u8]) {
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.insert(
            theme_id,
            key,
            StubAsset { content: StubContent::Attachment(b64), public_url: Some(url.to_string()) },
        );
        self.inner.lock().unwrap().external.insert(url.to_string(), bytes.to_vec());
    }

    /// Remove an asset behind the adapter's back
    pub fn drop_asset(&self, theme_id: u64, key: &str) {
        if let Some(theme) = self.inner.lock().unwrap().theme_mut(theme_id) {
            theme.assets.remove(key);
        }
    }

    pub fn has_asset(&self, theme_id: u64, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.theme_mut(theme_id).is_some_and(|t| t.assets.contains_key(key))
    }

    /// Fail the next request with `method` instead of answering it
    pub fn fail_next(&self, method: Method, error: FsError) {
        self.inner.lock().unwrap().failures.push((method, error));
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn count(&self, method: Method, resource: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.method == method && c.resource == resource)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.calls.len() + inner.fetches.len()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.inner.lock().unwrap().fetches.clone()
    }

    fn insert(&self, theme_id: u64, key: &str, asset: StubAsset) {
        let mut inner = self.inner.lock().unwrap();
        let theme = inner.theme_mut(theme_id).expect("stub theme must exist");
        theme.assets.insert(key.to_string(), asset);
    }

    fn answer(inner: &mut Inner, request: &ApiRequest) -> Result<Value, FsError> {
        if request.method == Method::Get && request.resource == THEMES_RESOURCE {
            let themes: Vec<Value> = inner
                .themes
                .iter()
                .map(|t| json!({
                    "id": t.id,
                    "name": t.name,
                    "role": "unpublished",
                    "created_at": t.created_at,
                    "updated_at": t.updated_at,
                }))
                .collect();
            return Ok(json!({ "themes": themes }));
        }

        let id = theme_id_of(&request.resource).ok_or_else(|| not_found(&request.resource))?;
        let theme = inner.theme_mut(id).ok_or_else(|| not_found(&request.resource))?;
        let key = request.query_value(ASSET_KEY_PARAM).map(str::to_string);

        match (request.method, key) {
            (Method::Get, None) => {
                let assets: Vec<Value> = theme.assets.iter().map(|(k, a)| a.record(k)).collect();
                Ok(json!({ "assets": assets }))
            }
            (Method::Get, Some(key)) => {
                let asset = theme.assets.get(&key).ok_or_else(|| not_found(&request.resource))?;
                let body = match &asset.content {
                    StubContent::Value(text) => json!({ "key": key, "value": text }),
                    StubContent::Attachment(b64) => json!({ "key": key, "attachment": b64 }),
                };
                Ok(json!({ "asset": body }))
            }
            (Method::Put, _) => {
                let fields = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("asset"))
                    .ok_or_else(|| FsError::HttpStatus { status: 422, resource: request.resource.clone() })?;
                let key = fields["key"].as_str().unwrap_or_default().to_string();
                let asset = if let Some(source) = fields.get("source_key").and_then(Value::as_str) {
                    let mut copy = theme.assets.get(source).cloned().ok_or_else(|| not_found(&request.resource))?;
                    copy.public_url = None;
                    copy
                } else {
                    let b64 = fields["attachment"].as_str().unwrap_or_default().to_string();
                    StubAsset { content: StubContent::Attachment(b64), public_url: None }
                };
                let record = asset.record(&key);
                theme.assets.insert(key, asset);
                Ok(json!({ "asset": record }))
            }
            (Method::Delete, Some(key)) => {
                theme.assets.remove(&key).ok_or_else(|| not_found(&request.resource))?;
                Ok(json!({ "message": format!("{} was successfully deleted", key) }))
            }
            (Method::Delete, None) => Err(FsError::HttpStatus { status: 422, resource: request.resource.clone() }),
        }
    }
}

#[async_trait]
impl Gateway for StubGateway {
    async fn send(&self, request: ApiRequest) -> Result<Value, FsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(request.clone());
        if let Some(pos) = inner.failures.iter().position(|(m, _)| *m == request.method) {
            let (_, error) = inner.failures.remove(pos);
            return Err(error);
        }
        Self::answer(&mut inner, &request)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetches.push(url.to_string());
        inner
            .external
            .get(url)
            .cloned()
            .ok_or_else(|| FsError::HttpStatus { status: 404, resource: url.to_string() })
    }

    fn display_name(&self) -> String {
        "stub".to_string()
    }
}
