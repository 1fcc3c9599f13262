//! Per-session item cache
//!
//! Maps virtual paths to resolved items. Populated lazily, never expired.
//! `/` is always present as the synthesized root directory.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::item::{Directory, Item};
use crate::path;

#[derive(Debug)]
pub struct ItemCache {
    items: BTreeMap<String, Item>,
    /// Themes whose asset list has been fetched at least once
    loaded_themes: HashSet<String>,
}

impl ItemCache {
    pub fn new() -> Self {
        let mut items = BTreeMap::new();
        items.insert("/".to_string(), Item::Directory(Directory::root()));
        Self { items, loaded_themes: HashSet::new() }
    }

    pub fn get(&self, path: &str) -> Option<&Item> {
        self.items.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.contains_key(path)
    }

    pub fn put(&mut self, path: impl Into<String>, item: Item) {
        let path = path.into();
        tracing::trace!("cache put {}", path);
        self.items.insert(path, item);
    }

    /// Remove one entry; the root is never removed
    pub fn remove(&mut self, path: &str) -> Option<Item> {
        if path == "/" {
            return None;
        }
        self.items.remove(path)
    }

    /// Names of the immediate children of `path`, deduplicated and sorted
    pub fn children_of(&self, path: &str) -> BTreeSet<String> {
        let prefix = if path == "/" { "/".to_string() } else { format!("{}/", path) };
        self.items
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, _)| key[prefix.len()..].split('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Drop synthesized directories above `path` that no longer have children.
    /// Stops at the first ancestor that is not an empty synthesized directory.
    pub fn prune_empty_directories(&mut self, path: &str) {
        let segments = path::segments(path);
        // Never walk up to the theme entry itself
        for depth in (2..segments.len()).rev() {
            let ancestor = format!("/{}", segments[..depth].join("/"));
            let removable = matches!(self.items.get(&ancestor), Some(Item::Directory(_)))
                && self.children_of(&ancestor).is_empty();
            if !removable {
                break;
            }
            tracing::debug!("pruning empty directory {}", ancestor);
            self.items.remove(&ancestor);
        }
    }

    pub fn mark_assets_loaded(&mut self, theme: &str) {
        self.loaded_themes.insert(theme.to_string());
    }

    pub fn assets_loaded(&self, theme: &str) -> bool {
        self.loaded_themes.contains(theme)
    }
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Asset, ContentLocation, Theme};

    fn theme(name: &str) -> Item {
        Item::Theme(Theme { id: 1, name: name.to_string(), created_at: None, updated_at: None })
    }

    fn asset(key: &str) -> Item {
        Item::Asset(Asset {
            key: key.to_string(),
            name: path::leaf_name(key).to_string(),
            size: 0,
            created_at: None,
            updated_at: None,
            content: ContentLocation::ByKey,
        })
    }

    fn dir(name: &str) -> Item {
        Item::Directory(Directory { name: name.to_string(), created_at: None, updated_at: None })
    }

    #[test]
    fn test_root_always_present() {
        let mut cache = ItemCache::new();
        assert!(matches!(cache.get("/"), Some(Item::Directory(_))));
        assert!(cache.remove("/").is_none());
        assert!(cache.contains("/"));
        assert!(cache.children_of("/").is_empty());
    }

    #[test]
    fn test_children_of_root_and_theme() {
        let mut cache = ItemCache::new();
        cache.put("/dawn", theme("dawn"));
        cache.put("/debut", theme("debut"));
        cache.put("/dawn/templates", dir("templates"));
        cache.put("/dawn/templates/index.liquid", asset("templates/index.liquid"));
        cache.put("/dawn/layout", dir("layout"));
        cache.put("/dawn/layout/theme.liquid", asset("layout/theme.liquid"));

        let root: Vec<_> = cache.children_of("/").into_iter().collect();
        assert_eq!(root, vec!["dawn", "debut"]);

        let dawn: Vec<_> = cache.children_of("/dawn").into_iter().collect();
        assert_eq!(dawn, vec!["layout", "templates"]);

        let templates: Vec<_> = cache.children_of("/dawn/templates").into_iter().collect();
        assert_eq!(templates, vec!["index.liquid"]);
    }

    #[test]
    fn test_children_of_ignores_sibling_prefixes() {
        let mut cache = ItemCache::new();
        cache.put("/dawn", theme("dawn"));
        cache.put("/dawn-copy", theme("dawn-copy"));
        cache.put("/dawn-copy/layout", dir("layout"));
        assert!(cache.children_of("/dawn").is_empty());
    }

    #[test]
    fn test_prune_empty_directories() {
        let mut cache = ItemCache::new();
        cache.put("/dawn", theme("dawn"));
        cache.put("/dawn/a", dir("a"));
        cache.put("/dawn/a/b", dir("b"));
        cache.put("/dawn/a/b/c.liquid", asset("a/b/c.liquid"));
        cache.put("/dawn/a/keep.liquid", asset("a/keep.liquid"));

        cache.remove("/dawn/a/b/c.liquid");
        cache.prune_empty_directories("/dawn/a/b/c.liquid");

        assert!(!cache.contains("/dawn/a/b"));
        assert!(cache.contains("/dawn/a"));
        assert!(cache.contains("/dawn"));
    }

    #[test]
    fn test_loaded_themes() {
        let mut cache = ItemCache::new();
        assert!(!cache.assets_loaded("dawn"));
        cache.mark_assets_loaded("dawn");
        assert!(cache.assets_loaded("dawn"));
    }
}
