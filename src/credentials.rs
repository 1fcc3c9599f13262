//! Login token parsing and the per-connection request authority
//!
//! The front-end only hands us a username and a password. The API key and
//! store name travel together in the username, e.g.
//! `e660fd027591bed89e9688d443e48fee@mystore` or `...#mystore`; the password
//! is the API secret.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::BridgeConfig;
use crate::error::FsError;

/// API key and store name extracted from a login token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginToken {
    pub api_key: String,
    pub store: String,
}

/// Split a login token on the first `@` or `#`.
///
/// No validation happens here: a token without a separator yields an empty
/// store, which later surfaces as a gateway failure.
pub fn parse_login(token: &str) -> LoginToken {
    let mut parts = token.splitn(2, ['@', '#']);
    let api_key = parts.next().unwrap_or_default().to_string();
    let rest = parts.next().unwrap_or_default();
    // Anything after a second separator is not part of the store name
    let store = rest.split(['@', '#']).next().unwrap_or_default().to_string();
    LoginToken { api_key, store }
}

/// Immutable request authority for one authenticated connection
#[derive(Debug, Clone)]
pub struct Session {
    api_key: String,
    store: String,
    secret: SecretString,
    scheme: String,
    platform_host: String,
}

impl Session {
    pub fn new(token: LoginToken, secret: SecretString, config: &BridgeConfig) -> Self {
        Self {
            api_key: token.api_key,
            store: token.store,
            secret,
            scheme: config.api_scheme.clone(),
            platform_host: config.platform_host.clone(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    /// `<store>.<platform_host>`
    pub fn host(&self) -> String {
        format!("{}.{}", self.store, self.platform_host)
    }

    /// Full credentialed URL for a remote resource.
    ///
    /// `<scheme>://<api_key>:<secret>@<store>.<host><resource>.json?<query>`
    pub fn resource_url(&self, resource: &str, query: &[(String, String)]) -> Result<Url, FsError> {
        let mut url = self.base_url()?;
        url.set_username(&self.api_key)
            .map_err(|_| FsError::Transport(format!("Cannot set API key on {}", self.host())))?;
        url.set_password(Some(self.secret.expose_secret()))
            .map_err(|_| FsError::Transport(format!("Cannot set secret on {}", self.host())))?;
        url.set_path(&format!("{}.json", resource));
        if !query.is_empty() {
            url.set_query(Some(&encode_query(query)));
        }
        Ok(url)
    }

    /// Same URL with the secret masked, for logs
    pub fn redacted_url(&self, resource: &str, query: &[(String, String)]) -> String {
        let mut rendered = format!(
            "{}://{}:***@{}{}.json",
            self.scheme,
            self.api_key,
            self.host(),
            resource
        );
        if !query.is_empty() {
            rendered.push('?');
            rendered.push_str(&encode_query(query));
        }
        rendered
    }

    fn base_url(&self) -> Result<Url, FsError> {
        let raw = format!("{}://{}", self.scheme, self.host());
        Url::parse(&raw).map_err(|e| FsError::Transport(format!("Invalid store host '{}': {}", self.host(), e)))
    }
}

/// Percent-encode keys and values and join them with `&`
pub fn encode_query(query: &[(String, String)]) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
