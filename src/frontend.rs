//! Per-connection login handshake
//!
//! The protocol front-end calls `user` then `pass`. A successful `pass` yields
//! the connection's `ThemeFs`, already holding the theme list fetched during
//! login.

use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::credentials::{parse_login, LoginToken, Session};
use crate::error::FsError;
use crate::gateway::{build_client, Gateway, HttpGateway};
use crate::proxy::ThemeFs;

/// Working directory handed to a freshly logged-in client
pub fn initial_cwd() -> &'static str {
    "/"
}

/// Info-level login line; names the store only
fn login_banner(token: &LoginToken) -> String {
    format!("Login for store '{}'", token.store)
}

/// Builds the gateway a session talks through
pub trait GatewayFactory: Send + Sync {
    fn create(&self, session: Session) -> Result<Box<dyn Gateway>, FsError>;
}

/// Production factory: one reqwest connection pool shared by every session
pub struct HttpGatewayFactory {
    client: reqwest::Client,
    config: BridgeConfig,
}

impl HttpGatewayFactory {
    pub fn new(config: BridgeConfig) -> Result<Self, FsError> {
        let client = build_client(&config.http)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl GatewayFactory for HttpGatewayFactory {
    fn create(&self, session: Session) -> Result<Box<dyn Gateway>, FsError> {
        Ok(Box::new(HttpGateway::with_client(session, self.client.clone(), &self.config.http)))
    }
}

/// Login state of one connection
#[derive(Debug, Default)]
pub struct Login {
    token: Option<LoginToken>,
}

impl Login {
    pub fn new() -> Self {
        Self::default()
    }

    /// USER: remember the API key and store carried by the username
    pub fn user(&mut self, username: &str) {
        let token = parse_login(username);
        info!("{}", login_banner(&token));
        debug!("Login api key: {}", token.api_key);
        self.token = Some(token);
    }

    /// PASS: build the session and fetch the theme list.
    ///
    /// Fails when no username was given, or when the theme fetch fails.
    pub async fn pass(
        &self,
        secret: SecretString,
        factory: &dyn GatewayFactory,
        config: &BridgeConfig,
    ) -> Result<ThemeFs, FsError> {
        let Some(token) = self.token.clone() else {
            warn!("PASS without USER");
            return Err(FsError::permission_denied());
        };

        let session = Session::new(token, secret, config);
        let gateway = factory.create(session)?;
        match ThemeFs::connect(gateway).await {
            Ok(fs) => Ok(fs),
            Err(e) => {
                warn!("Login failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Method, THEMES_RESOURCE};
    use crate::testing::StubGateway;
    use crate::vfs::VirtualFs;
    use std::sync::{Arc, Mutex};

    struct StubFactory {
        gateway: Arc<StubGateway>,
        sessions: Mutex<Vec<Session>>,
    }

    impl StubFactory {
        fn new(gateway: Arc<StubGateway>) -> Self {
            Self { gateway, sessions: Mutex::new(Vec::new()) }
        }
    }

    impl GatewayFactory for StubFactory {
        fn create(&self, session: Session) -> Result<Box<dyn Gateway>, FsError> {
            self.sessions.lock().unwrap().push(session);
            Ok(Box::new(self.gateway.clone()))
        }
    }

    fn secret() -> SecretString {
        SecretString::from("shpss_secret".to_string())
    }

    #[tokio::test]
    async fn test_login_builds_session_and_fetches_themes() {
        let gw = Arc::new(StubGateway::new());
        gw.add_theme(1, "Dawn");
        let factory = StubFactory::new(gw.clone());

        let mut login = Login::new();
        login.user("e660fd027591bed89e9688d443e48fee@mystore");
        let mut fs = login.pass(secret(), &factory, &BridgeConfig::default()).await.unwrap();

        let sessions = factory.sessions.lock().unwrap().clone();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].api_key(), "e660fd027591bed89e9688d443e48fee");
        assert_eq!(sessions[0].store(), "mystore");
        assert_eq!(sessions[0].host(), "mystore.myshopify.com");

        assert_eq!(gw.count(Method::Get, THEMES_RESOURCE), 1);
        assert_eq!(fs.list(initial_cwd()).await.unwrap(), vec!["Dawn"]);
        assert_eq!(gw.count(Method::Get, THEMES_RESOURCE), 1);
    }

    #[tokio::test]
    async fn test_pass_without_user_denied() {
        let gw = Arc::new(StubGateway::new());
        let factory = StubFactory::new(gw.clone());

        let result = Login::new().pass(secret(), &factory, &BridgeConfig::default()).await;
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));
        assert_eq!(gw.total_calls(), 0);
        assert!(factory.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_theme_fetch_fails_login() {
        let gw = Arc::new(StubGateway::new());
        gw.fail_next(Method::Get, FsError::HttpStatus { status: 401, resource: THEMES_RESOURCE.into() });
        let factory = StubFactory::new(gw.clone());

        let mut login = Login::new();
        login.user("key#shop");
        let result = login.pass(secret(), &factory, &BridgeConfig::default()).await;
        assert!(matches!(result, Err(FsError::HttpStatus { status: 401, .. })));
    }

    #[test]
    fn test_login_banner_omits_api_key() {
        let banner = login_banner(&parse_login("e660fd027591bed89e9688d443e48fee@mystore"));
        assert_eq!(banner, "Login for store 'mystore'");
        assert!(!banner.contains("e660fd"));
    }

    #[test]
    fn test_initial_cwd_is_root() {
        assert_eq!(initial_cwd(), "/");
    }

    #[test]
    fn test_http_factory_creates_gateway() {
        let factory = HttpGatewayFactory::new(BridgeConfig::default()).unwrap();
        let session = Session::new(parse_login("key@shop"), secret(), factory.config());
        let gateway = factory.create(session).unwrap();
        assert_eq!(gateway.display_name(), "shop.myshopify.com (key)");
    }
}
