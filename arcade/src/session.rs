use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, Weak};

use arcade_auth::{Auth, OnLogin};
use arcade_content::Content;
use arcade_core::{Client, Mode};
use arcade_inventory::Inventory;
use arcade_stats::Stats;
use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::{watch, OnceCell};

/// Progress of the session bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// [`Session::ready`] was never awaited.
    Uninitialized,
    /// The bootstrap is running.
    Bootstrapping,
    /// The bootstrap finished. This state is terminal.
    Ready,
}

/// Session is the authorized view of the backend.
///
/// The first [`Session::ready`] runs the bootstrap exactly once:
///
/// - In server mode the session is ready right away; requests are signed.
/// - In client mode an anonymous guest session is created unless an access
///   token is already stored, then the identity is fetched.
///
/// Failures during the bootstrap are logged and never fatal: the session
/// always reaches [`BootstrapState::Ready`], possibly without identity.
///
/// Every later login through [`Session::auth`] refreshes the identity, so
/// [`Session::identity`] always reflects the most recent login.
pub struct Session {
    client: Client,
    auth: Auth,
    stats: Stats,
    inventory: Inventory,
    content: Content,

    ready: OnceCell<()>,
    state: Mutex<BootstrapState>,
    identity: watch::Sender<Option<i64>>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("state", &self.state())
            .field("identity", &self.identity())
            .finish()
    }
}

impl Session {
    pub(crate) fn new(client: Client) -> Arc<Self> {
        let (identity, _) = watch::channel(None);

        Arc::new_cyclic(|session: &Weak<Session>| {
            let hook: Weak<dyn OnLogin> = session.clone();
            Self {
                auth: Auth::with_hook(client.clone(), hook),
                stats: Stats::new(client.clone()),
                inventory: Inventory::new(client.clone()),
                content: Content::new(client.clone()),
                client,

                ready: OnceCell::new(),
                state: Mutex::new(BootstrapState::Uninitialized),
                identity,
            }
        })
    }

    /// Wait until the bootstrap has finished, running it on first call.
    ///
    /// Concurrent callers share the same bootstrap.
    pub async fn ready(&self) {
        self.ready.get_or_init(|| self.bootstrap()).await;
    }

    /// Current bootstrap state.
    pub fn state(&self) -> BootstrapState {
        *self.state.lock().expect("lock poisoned")
    }

    /// Id of the account behind the stored access token, if known.
    pub fn identity(&self) -> Option<i64> {
        *self.identity.borrow()
    }

    /// Watch identity changes caused by the bootstrap and by logins.
    pub fn subscribe_identity(&self) -> watch::Receiver<Option<i64>> {
        self.identity.subscribe()
    }

    /// Fetch the current account and store its id as identity.
    ///
    /// On failure the identity is left untouched and a warning is logged.
    pub async fn refresh_identity(&self) {
        match self.auth.me().await {
            Ok(account) => {
                debug!("session identity is now {}", account.id);
                self.identity.send_replace(Some(account.id));
            }
            Err(err) => warn!("failed to fetch session identity: {err}"),
        }
    }

    /// The client shared by every façade of this session.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Auth façade; its logins refresh this session's identity.
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Stats façade.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Inventory façade.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Content manifest façade.
    pub fn content(&self) -> &Content {
        &self.content
    }

    fn set_state(&self, state: BootstrapState) {
        *self.state.lock().expect("lock poisoned") = state;
    }

    async fn bootstrap(&self) {
        self.set_state(BootstrapState::Bootstrapping);

        match self.client.mode() {
            Mode::Server => debug!("server mode session needs no anonymous login"),
            Mode::Client => {
                let _guard = self.client.tokens().lock_login().await;

                let authorized = if self.client.tokens().access_token().is_some() {
                    debug!("access token already stored, skip anonymous login");
                    true
                } else {
                    match self.auth.create_anonymous().await {
                        Ok(_) => true,
                        Err(err) => {
                            warn!("failed to create anonymous session: {err}");
                            false
                        }
                    }
                };

                if authorized {
                    self.refresh_identity().await;
                }
            }
        }

        self.set_state(BootstrapState::Ready);
        debug!("session is ready with identity {:?}", self.identity());
    }
}

#[async_trait]
impl OnLogin for Session {
    async fn on_login(&self) {
        self.refresh_identity().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::constants::{ACCOUNT_ME_PATH, AUTH_TOKEN_PATH};
    use arcade_core::{Config, Context, HttpSend, Registry, Result};
    use bytes::Bytes;
    use http::{header, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[derive(Debug, Clone, Default)]
    struct MockHttpSend {
        routes: Arc<Mutex<HashMap<&'static str, (StatusCode, Value)>>>,
        sent: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    }

    impl MockHttpSend {
        fn route(&self, path: &'static str, status: StatusCode, body: Value) {
            self.routes.lock().unwrap().insert(path, (status, body));
        }

        fn calls(&self, path: &str) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|req| req.uri().path() == path)
                .count()
        }
    }

    #[async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            // Let concurrent callers interleave.
            tokio::task::yield_now().await;

            let (status, body) = self
                .routes
                .lock()
                .unwrap()
                .get(req.uri().path())
                .cloned()
                .unwrap_or((StatusCode::NOT_FOUND, json!({"message": "no route"})));
            self.sent.lock().unwrap().push(req);

            let mut resp = http::Response::new(Bytes::from(body.to_string()));
            *resp.status_mut() = status;
            Ok(resp)
        }
    }

    fn registry(http: impl HttpSend, mode: Mode) -> Registry {
        let _ = env_logger::builder().is_test(true).try_init();

        let registry = Registry::new(Context::new().with_http_send(http));
        registry
            .configure(
                Config::new()
                    .with_api_base("https://api.example.com")
                    .with_customer_id("DE_123")
                    .with_project_id("pid")
                    .with_mode(mode)
                    .with_server_secret("secret"),
            )
            .unwrap();
        registry
    }

    /// Issues `{username}-access` tokens and logs every call, yielding
    /// around each one so that unserialized logins would interleave.
    #[derive(Debug, Clone, Default)]
    struct LoginBackend {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl LoginBackend {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        async fn settle() {
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
    }

    fn account_id(access_token: &str) -> i64 {
        match access_token {
            "guest-access" => 1,
            "alice-access" => 2,
            "bob-access" => 3,
            _ => 0,
        }
    }

    #[async_trait]
    impl HttpSend for LoginBackend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            Self::settle().await;
            let body = match req.uri().path() {
                AUTH_TOKEN_PATH => {
                    let grant: Value = serde_json::from_slice(req.body())?;
                    let user = grant["username"].as_str().unwrap_or("guest").to_string();
                    self.events.lock().unwrap().push(format!("token {user}"));
                    json!({"access_token": format!("{user}-access")})
                }
                ACCOUNT_ME_PATH => {
                    let token = req.headers()[header::AUTHORIZATION]
                        .to_str()
                        .unwrap()
                        .trim_start_matches("Bearer ")
                        .to_string();
                    self.events.lock().unwrap().push(format!("me {token}"));
                    json!({"id": account_id(&token)})
                }
                path => panic!("unexpected request to {path}"),
            };
            Self::settle().await;

            Ok(http::Response::new(Bytes::from(body.to_string())))
        }
    }

    fn client_backend() -> MockHttpSend {
        let http = MockHttpSend::default();
        http.route(
            AUTH_TOKEN_PATH,
            StatusCode::OK,
            json!({"access_token": "guest-access", "refresh_token": "guest-refresh"}),
        );
        http.route(ACCOUNT_ME_PATH, StatusCode::OK, json!({"id": 7}));
        http
    }

    #[tokio::test]
    async fn test_server_mode_skips_anonymous_login() {
        let http = client_backend();
        let session = Session::new(registry(http.clone(), Mode::Server).client().unwrap());
        assert_eq!(session.state(), BootstrapState::Uninitialized);

        session.ready().await;

        assert_eq!(session.state(), BootstrapState::Ready);
        assert_eq!(http.calls(AUTH_TOKEN_PATH), 0);
        assert_eq!(http.calls(ACCOUNT_ME_PATH), 0);
        assert_eq!(session.identity(), None);
    }

    #[tokio::test]
    async fn test_client_mode_bootstrap() {
        let http = client_backend();
        let registry = registry(http.clone(), Mode::Client);
        let session = Session::new(registry.client().unwrap());

        session.ready().await;

        assert_eq!(session.state(), BootstrapState::Ready);
        assert_eq!(session.identity(), Some(7));
        assert_eq!(http.calls(AUTH_TOKEN_PATH), 1);
        assert_eq!(http.calls(ACCOUNT_ME_PATH), 1);
        assert_eq!(
            registry.tokens().access_token().as_deref(),
            Some("guest-access")
        );

        let sent = http.sent.lock().unwrap();
        assert_eq!(sent[0].uri().path(), AUTH_TOKEN_PATH);
        assert_eq!(sent[1].headers()[header::AUTHORIZATION], "Bearer guest-access");
    }

    #[tokio::test]
    async fn test_identity_failure_is_not_fatal() {
        let http = client_backend();
        http.route(
            ACCOUNT_ME_PATH,
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"message": "boom"}),
        );
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());

        session.ready().await;

        assert_eq!(session.state(), BootstrapState::Ready);
        assert_eq!(session.identity(), None);
        assert_eq!(http.calls(AUTH_TOKEN_PATH), 1);
        assert_eq!(http.calls(ACCOUNT_ME_PATH), 1);
    }

    #[tokio::test]
    async fn test_anonymous_failure_is_not_fatal() {
        let http = client_backend();
        http.route(
            AUTH_TOKEN_PATH,
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"message": "down"}),
        );
        let registry = registry(http.clone(), Mode::Client);
        let session = Session::new(registry.client().unwrap());

        session.ready().await;

        assert_eq!(session.state(), BootstrapState::Ready);
        assert_eq!(session.identity(), None);
        assert_eq!(http.calls(ACCOUNT_ME_PATH), 0);
        assert_eq!(registry.tokens().access_token(), None);
    }

    #[tokio::test]
    async fn test_stored_token_skips_anonymous_login() {
        let http = client_backend();
        let registry = registry(http.clone(), Mode::Client);
        registry.tokens().set("player-access", None);
        let session = Session::new(registry.client().unwrap());

        session.ready().await;

        assert_eq!(http.calls(AUTH_TOKEN_PATH), 0);
        assert_eq!(session.identity(), Some(7));
        let sent = http.sent.lock().unwrap();
        assert_eq!(sent[0].headers()[header::AUTHORIZATION], "Bearer player-access");
    }

    #[tokio::test]
    async fn test_concurrent_ready_bootstraps_once() {
        let http = client_backend();
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());

        tokio::join!(
            session.ready(),
            session.ready(),
            session.ready(),
            session.ready()
        );
        session.ready().await;

        assert_eq!(http.calls(AUTH_TOKEN_PATH), 1);
        assert_eq!(http.calls(ACCOUNT_ME_PATH), 1);
        assert_eq!(session.state(), BootstrapState::Ready);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ready_across_tasks() {
        let http = client_backend();
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move {
                    session.ready().await;
                    (session.state(), session.identity())
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), (BootstrapState::Ready, Some(7)));
        }

        assert_eq!(http.calls(AUTH_TOKEN_PATH), 1);
    }

    #[tokio::test]
    async fn test_login_refreshes_identity() -> anyhow::Result<()> {
        let http = client_backend();
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());
        session.ready().await;
        let mut identity = session.subscribe_identity();
        assert_eq!(*identity.borrow_and_update(), Some(7));

        http.route(
            AUTH_TOKEN_PATH,
            StatusCode::OK,
            json!({"access_token": "player-access"}),
        );
        http.route(ACCOUNT_ME_PATH, StatusCode::OK, json!({"id": 9}));
        session.auth().login("player", "hunter2").await?;

        assert!(identity.has_changed()?);
        assert_eq!(*identity.borrow_and_update(), Some(9));
        assert_eq!(session.identity(), Some(9));
        assert_eq!(
            session.client().get_tokens().refresh_token.as_deref(),
            Some("guest-refresh")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_logins_are_serialized() -> anyhow::Result<()> {
        let http = LoginBackend::default();
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());
        session.ready().await;

        let (alice, bob) = tokio::join!(
            session.auth().login("alice", "pw"),
            session.auth().login("bob", "pw")
        );
        alice?;
        bob?;

        let events = http.events();
        assert_eq!(
            events,
            vec![
                "token guest",
                "me guest-access",
                "token alice",
                "me alice-access",
                "token bob",
                "me bob-access",
            ]
        );
        for pair in events.chunks(2) {
            let user = pair[0].trim_start_matches("token ");
            assert_eq!(pair[1], format!("me {user}-access"));
        }

        let access_token = session.client().get_tokens().access_token.unwrap();
        assert_eq!(session.identity(), Some(account_id(&access_token)));
        assert_eq!(session.identity(), Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_login_waits_for_bootstrap() -> anyhow::Result<()> {
        let http = LoginBackend::default();
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());

        let ((), login) = tokio::join!(session.ready(), session.auth().login("bob", "pw"));
        login?;

        assert_eq!(
            http.events(),
            vec!["token guest", "me guest-access", "token bob", "me bob-access"]
        );
        assert_eq!(session.state(), BootstrapState::Ready);
        assert_eq!(session.identity(), Some(3));
        assert_eq!(
            session.client().get_tokens().access_token.as_deref(),
            Some("bob-access")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_identity() {
        let http = client_backend();
        let session = Session::new(registry(http.clone(), Mode::Client).client().unwrap());
        session.ready().await;

        http.route(ACCOUNT_ME_PATH, StatusCode::UNAUTHORIZED, json!({}));
        session.refresh_identity().await;

        assert_eq!(session.identity(), Some(7));
    }
}
