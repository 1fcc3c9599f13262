// ThemeFTP - theme assets of a hosted store as a virtual filesystem
// Serves FTP-style filesystem callbacks from the store's theme REST API

pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod frontend;
pub mod gateway;
pub mod item;
pub mod metadata;
pub mod path;
pub mod proxy;
pub mod resolver;
pub mod vfs;

#[cfg(test)]
mod testing;

pub use config::{load_config, BridgeConfig, ConfigError, HttpConfig};
pub use credentials::{parse_login, LoginToken, Session};
pub use error::FsError;
pub use frontend::{initial_cwd, GatewayFactory, HttpGatewayFactory, Login};
pub use gateway::{Gateway, HttpGateway};
pub use item::{Asset, Directory, Item, Theme};
pub use proxy::ThemeFs;
pub use vfs::{EntryKind, StatRecord, VirtualFs};
