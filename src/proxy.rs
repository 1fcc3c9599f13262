//! Theme filesystem adapter
//!
//! Serves filesystem operations for one session on top of the item cache and
//! the remote gateway:
//!
//! ```text
//! /                              themes (the login listing answers the first `list("/")`)
//! /<theme>                       theme
//! /<theme>/<dir>/...             synthesized from asset keys
//! /<theme>/<asset key>           asset
//! ```
//!
//! Lookups that miss the cache refetch once (theme list or asset list) and
//! then give up with `NotFound`.

use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::ItemCache;
use crate::error::FsError;
use crate::gateway::types::{decode, AssetContent, AssetEnvelope, AssetRecord, AssetUpdate};
use crate::gateway::{asset_query, assets_resource, Gateway};
use crate::item::{Asset, ContentLocation, Item, Theme};
use crate::metadata::to_stat_record;
use crate::path;
use crate::resolver;
use crate::vfs::{StatRecord, VirtualFs};

/// Minimum segments of a rename source or target: theme + directory + name
const RENAME_MIN_SEGMENTS: usize = 3;

pub struct ThemeFs {
    gateway: Box<dyn Gateway>,
    cache: ItemCache,
    /// Theme list fetched at login, consumed by the first root listing
    initial_themes: Option<Vec<Theme>>,
}

impl ThemeFs {
    pub fn new(gateway: Box<dyn Gateway>) -> Self {
        Self {
            gateway,
            cache: ItemCache::new(),
            initial_themes: None,
        }
    }

    /// Fetch the theme list up front; a failure here fails the login
    pub async fn connect(gateway: Box<dyn Gateway>) -> Result<Self, FsError> {
        let mut fs = Self::new(gateway);
        let themes = resolver::load_themes(fs.gateway.as_ref(), &mut fs.cache).await?;
        info!("Connected to {} ({} themes)", fs.gateway.display_name(), themes.len());
        fs.initial_themes = Some(themes);
        Ok(fs)
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    pub fn display_name(&self) -> String {
        self.gateway.display_name()
    }

    async fn resolve_theme(&mut self, path: &str) -> Result<Theme, FsError> {
        resolver::resolve_theme(self.gateway.as_ref(), &mut self.cache, path).await
    }

    async fn load_assets(&mut self, theme: &Theme) -> Result<(), FsError> {
        let count = resolver::load_assets(self.gateway.as_ref(), &mut self.cache, theme).await?;
        debug!("{} assets cached for {}", count, theme.name);
        Ok(())
    }

    /// Cached item at `path`, reloading the theme's assets once on a miss
    async fn ensure_cached(&mut self, path: &str, theme: &Theme) -> Result<Item, FsError> {
        if let Some(item) = self.cache.get(path) {
            return Ok(item.clone());
        }
        debug!("{} not cached, reloading assets of {}", path, theme.name);
        self.load_assets(theme).await?;
        self.cached(path)
    }

    fn cached(&self, path: &str) -> Result<Item, FsError> {
        match self.cache.get(path) {
            Some(item) => Ok(item.clone()),
            None => {
                warn!("Not found: {}", path);
                Err(FsError::NotFound(path.to_string()))
            }
        }
    }

    /// Cache the asset record echoed by a PUT, if the response carries one
    fn cache_put_response(&mut self, theme: &Theme, response: Value) {
        match decode::<AssetEnvelope<AssetRecord>>(response, "asset") {
            Ok(envelope) => resolver::insert_asset(&mut self.cache, theme, Asset::from(envelope.asset)),
            Err(e) => debug!("PUT response not cached: {}", e),
        }
    }

    fn evict(&mut self, path: &str) {
        self.cache.remove(path);
        self.cache.prune_empty_directories(path);
    }

    async fn fetch_by_key(&self, theme: &Theme, key: &str) -> Result<Vec<u8>, FsError> {
        let body = self.gateway.get(&assets_resource(theme.id), asset_query(key)).await?;
        let envelope: AssetEnvelope<AssetContent> = decode(body, "asset")?;
        decode_content(key, envelope.asset)
    }
}

/// Theme names in listing order, without duplicates
fn theme_names(themes: &[Theme]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(themes.len());
    for theme in themes {
        if !names.contains(&theme.name) {
            names.push(theme.name.clone());
        }
    }
    names
}

/// Inline text wins over a base64 attachment
fn decode_content(key: &str, content: AssetContent) -> Result<Vec<u8>, FsError> {
    if let Some(value) = content.value {
        return Ok(value.into_bytes());
    }
    match content.attachment {
        Some(attachment) => base64::engine::general_purpose::STANDARD
            .decode(attachment.trim())
            .map_err(|e| FsError::ParseError(format!("Invalid attachment for {}: {}", key, e))),
        None => Err(FsError::ParseError(format!("Asset {} has neither value nor attachment", key))),
    }
}

#[async_trait]
impl VirtualFs for ThemeFs {
    async fn list(&mut self, path: &str) -> Result<Vec<String>, FsError> {
        let path = path::normalize(path);
        debug!("list {}", path);

        if path == "/" {
            let themes = match self.initial_themes.take() {
                Some(themes) => themes,
                None => resolver::load_themes(self.gateway.as_ref(), &mut self.cache).await?,
            };
            return Ok(theme_names(&themes));
        }

        let theme = self.resolve_theme(&path).await?;
        if self.cache.assets_loaded(&theme.name) {
            self.ensure_cached(&path, &theme).await?;
        } else {
            // A fresh asset list is already the one refetch this call gets
            self.load_assets(&theme).await?;
            self.cached(&path)?;
        }
        Ok(self.cache.children_of(&path).into_iter().collect())
    }

    async fn stat(&mut self, path: &str) -> Result<StatRecord, FsError> {
        let path = path::normalize(path);
        if path == "/" {
            if let Some(root) = self.cache.get("/") {
                return Ok(to_stat_record(root));
            }
        }

        let theme = self.resolve_theme(&path).await?;
        let item = self.ensure_cached(&path, &theme).await?;
        Ok(to_stat_record(&item))
    }

    async fn read(&mut self, path: &str) -> Result<Vec<u8>, FsError> {
        let path = path::normalize(path);
        let theme = self.resolve_theme(&path).await?;
        let asset = match self.ensure_cached(&path, &theme).await? {
            Item::Asset(asset) => asset,
            Item::Theme(_) | Item::Directory(_) => return Err(FsError::IsADirectory(path)),
        };

        let key = path::asset_key(&path);
        let data = match asset.content {
            ContentLocation::External(ref url) => self.gateway.fetch(url).await?,
            ContentLocation::ByKey => self.fetch_by_key(&theme, &key).await?,
        };
        debug!("read {} ({} bytes)", path, data.len());
        Ok(data)
    }

    async fn write(&mut self, path: &str, data: &[u8]) -> Result<(), FsError> {
        let path = path::normalize(path);
        let theme = self.resolve_theme(&path).await?;
        let key = path::asset_key(&path);
        if key.is_empty() {
            return Err(FsError::permission_denied());
        }
        if self.cache.get(&path).is_some_and(Item::is_dir) {
            return Err(FsError::IsADirectory(path));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        let body = serde_json::to_value(AssetUpdate::attachment(&key, encoded))
            .map_err(|e| FsError::ParseError(format!("Failed to encode asset {}: {}", key, e)))?;
        let response = self.gateway.put(&assets_resource(theme.id), body).await?;

        info!("wrote {} ({} bytes)", path, data.len());
        self.cache_put_response(&theme, response);
        Ok(())
    }

    async fn remove(&mut self, path: &str) -> Result<(), FsError> {
        let path = path::normalize(path);
        let theme = self.resolve_theme(&path).await?;
        let key = path::asset_key(&path);
        if key.is_empty() || matches!(self.cache.get(&path), Some(Item::Directory(_))) {
            return Err(FsError::permission_denied());
        }

        self.gateway.delete(&assets_resource(theme.id), asset_query(&key)).await?;

        info!("removed {}", path);
        self.evict(&path);
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), FsError> {
        let from = path::normalize(from);
        let to = path::normalize(to);
        if path::segments(&from).len() < RENAME_MIN_SEGMENTS || path::segments(&to).len() < RENAME_MIN_SEGMENTS {
            return Err(FsError::permission_denied());
        }
        if path::theme_name(&from) != path::theme_name(&to) {
            warn!("Refusing cross-theme rename {} -> {}", from, to);
            return Err(FsError::permission_denied());
        }
        // Copy-then-delete onto the same key would delete the only copy
        if from == to {
            debug!("rename {} onto itself, nothing to do", from);
            return Ok(());
        }

        let theme = self.resolve_theme(&from).await?;
        if matches!(self.cache.get(&from), Some(Item::Directory(_))) {
            return Err(FsError::permission_denied());
        }

        let src_key = path::asset_key(&from);
        let dst_key = path::asset_key(&to);
        let resource = assets_resource(theme.id);

        let body = serde_json::to_value(AssetUpdate::copy(&src_key, &dst_key))
            .map_err(|e| FsError::ParseError(format!("Failed to encode copy of {}: {}", src_key, e)))?;
        let response = self.gateway.put(&resource, body).await?;
        self.cache_put_response(&theme, response);

        // Not atomic: a failed delete leaves both keys in place
        if let Err(e) = self.gateway.delete(&resource, asset_query(&src_key)).await {
            warn!("Copied {} to {} but could not delete the source: {}", from, to, e);
            return Err(e);
        }

        info!("renamed {} -> {}", from, to);
        self.evict(&from);
        Ok(())
    }

    async fn mkdir(&mut self, path: &str, _mode: u32) -> Result<(), FsError> {
        // Directories only exist as asset key prefixes
        debug!("mkdir {} refused", path);
        Err(FsError::permission_denied())
    }

    async fn rmdir(&mut self, path: &str) -> Result<(), FsError> {
        debug!("rmdir {} refused", path);
        Err(FsError::permission_denied())
    }
}
