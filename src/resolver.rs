//! Path resolution and directory synthesis
//!
//! Themes come from one listing call, assets from one call per theme. Asset
//! keys are flat (`templates/index.liquid`), so every ancestor segment gets a
//! synthesized directory entry when a theme's assets are loaded.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::cache::ItemCache;
use crate::error::FsError;
use crate::gateway::types::{decode, AssetList, ThemeList};
use crate::gateway::{assets_resource, Gateway, THEMES_RESOURCE};
use crate::item::{Asset, Directory, Item, Theme};
use crate::path;

/// Fetch the theme list and cache every theme under `/<name>`
pub async fn load_themes(gateway: &dyn Gateway, cache: &mut ItemCache) -> Result<Vec<Theme>, FsError> {
    let body = gateway.get(THEMES_RESOURCE, Vec::new()).await?;
    let list: ThemeList = decode(body, "theme list")?;

    let themes: Vec<Theme> = list.themes.into_iter().map(Theme::from).collect();
    for theme in &themes {
        cache.put(path::join("/", &theme.name), Item::Theme(theme.clone()));
    }
    info!("fetched {} themes", themes.len());
    Ok(themes)
}

/// Theme owning `path`, refetching the theme list once on a cache miss
pub async fn resolve_theme(gateway: &dyn Gateway, cache: &mut ItemCache, path: &str) -> Result<Theme, FsError> {
    let theme_path = path::join("/", path::theme_name(path));
    if let Some(theme) = cache.get(&theme_path).and_then(Item::as_theme) {
        return Ok(theme.clone());
    }

    debug!("theme {} not cached, refreshing theme list", theme_path);
    load_themes(gateway, cache).await?;

    match cache.get(&theme_path).and_then(Item::as_theme) {
        Some(theme) => Ok(theme.clone()),
        None => {
            warn!("Not found: {}", theme_path);
            Err(FsError::NotFound(theme_path))
        }
    }
}

/// Fetch a theme's asset list, cache each asset at `/<theme>/<key>` and a
/// synthesized directory for every ancestor segment not already cached.
/// Returns the number of assets listed.
pub async fn load_assets(gateway: &dyn Gateway, cache: &mut ItemCache, theme: &Theme) -> Result<usize, FsError> {
    let body = gateway.get(&assets_resource(theme.id), Vec::new()).await?;
    let list: AssetList = decode(body, "asset list")?;

    let theme_path = path::join("/", &theme.name);
    let count = list.assets.len();
    let mut directories = BTreeSet::new();

    for record in list.assets {
        let asset = Asset::from(record);
        let parent = path::key_parent(&asset.key);
        if !parent.is_empty() {
            directories.insert(parent.to_string());
        }
        insert_asset(cache, theme, asset);
    }

    cache.mark_assets_loaded(&theme.name);
    info!(
        "fetched assets for: {} ({} assets, {} directories)",
        theme_path,
        count,
        directories.len()
    );
    Ok(count)
}

/// Cache one asset of `theme` together with its ancestor directories
pub fn insert_asset(cache: &mut ItemCache, theme: &Theme, asset: Asset) {
    let theme_path = path::join("/", &theme.name);
    for dir_key in path::key_ancestors(&asset.key) {
        let dir_path = path::join(&theme_path, &dir_key);
        if !cache.contains(&dir_path) {
            let dir = Directory::within(theme, path::leaf_name(&dir_key));
            cache.put(dir_path, Item::Directory(dir));
        }
    }
    let asset_path = path::join(&theme_path, &asset.key);
    cache.put(asset_path, Item::Asset(asset));
}
