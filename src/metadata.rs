//! Item -> StatRecord conversion

use chrono::{DateTime, Utc};

use crate::item::{Item, Timestamp};
use crate::vfs::{EntryKind, StatRecord};

/// Build the stat record for a cached item
pub fn to_stat_record(item: &Item) -> StatRecord {
    let (kind, size, created_at, updated_at) = match item {
        Item::Theme(theme) => (EntryKind::Directory, 0, &theme.created_at, &theme.updated_at),
        Item::Directory(dir) => (EntryKind::Directory, 0, &dir.created_at, &dir.updated_at),
        Item::Asset(asset) => (EntryKind::File, asset.size, &asset.created_at, &asset.updated_at),
    };
    let mtime = resolve_time(updated_at.as_ref());
    StatRecord {
        name: item.name().to_string(),
        kind,
        size,
        mtime,
        ctime: resolve_time(created_at.as_ref()),
        atime: mtime,
    }
}

/// Parse textual timestamps, pass parsed ones through
fn resolve_time(ts: Option<&Timestamp>) -> Option<DateTime<Utc>> {
    match ts? {
        Timestamp::At(at) => Some(*at),
        Timestamp::Text(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!("Invalid timestamp '{}': {}", text, e);
                None
            }
        },
    }
}
