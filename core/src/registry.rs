use std::sync::{Arc, OnceLock};

use log::debug;

use crate::{Client, Config, Context, Error, Result, Settings, TokenStore};

/// Registry owns the state shared by every client of one application.
///
/// It holds the settings, which can be configured exactly once, and the
/// single [`TokenStore`]. Clones of a registry share all of it, so a
/// client handed out before the session exists sees the same credentials
/// as the session afterwards.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    ctx: Context,
    settings: Arc<OnceLock<Arc<Settings>>>,
    tokens: TokenStore,
}

impl Registry {
    /// Create an unconfigured registry using the given context.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            settings: Arc::default(),
            tokens: TokenStore::new(),
        }
    }

    /// Validate and store the configuration.
    ///
    /// Settings are immutable afterwards: configuring twice fails with
    /// [`ErrorKind::ConfigInvalid`](crate::ErrorKind::ConfigInvalid).
    pub fn configure(&self, config: Config) -> Result<()> {
        let settings = Arc::new(config.build()?);
        debug!("configure registry with {settings:?}");
        self.settings
            .set(settings)
            .map_err(|_| Error::config_invalid("registry is already configured"))
    }

    /// Whether [`Registry::configure`] has succeeded.
    pub fn is_configured(&self) -> bool {
        self.settings.get().is_some()
    }

    /// Get the settings, failing with
    /// [`ErrorKind::NotConfigured`](crate::ErrorKind::NotConfigured) before
    /// configuration.
    pub fn settings(&self) -> Result<Arc<Settings>> {
        self.settings
            .get()
            .cloned()
            .ok_or_else(|| Error::not_configured("configure the registry before use"))
    }

    /// The context used by all clients.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The shared credential store.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Build a client sharing this registry's settings and credentials.
    pub fn client(&self) -> Result<Client> {
        Ok(Client::new(
            self.ctx.clone(),
            self.settings()?,
            self.tokens.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        Config::new()
            .with_api_base("https://api.example.com")
            .with_customer_id("DE_123")
            .with_project_id("pid")
    }

    #[test]
    fn test_client_before_configure() {
        let registry = Registry::new(Context::new());

        let err = registry.client().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
        assert!(!registry.is_configured());
    }

    #[test]
    fn test_configure_once() {
        let registry = Registry::new(Context::new());
        registry.configure(config()).unwrap();

        let err = registry
            .configure(config().with_project_id("other"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(registry.settings().unwrap().project_id(), "pid");
    }

    #[test]
    fn test_invalid_config_leaves_registry_unconfigured() {
        let registry = Registry::new(Context::new());

        let err = registry
            .configure(Config::new().with_api_base("https://api.example.com"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(!registry.is_configured());
    }

    #[test]
    fn test_clients_share_tokens() {
        let registry = Registry::new(Context::new());
        registry.configure(config()).unwrap();

        let a = registry.client().unwrap();
        let b = registry.clone().client().unwrap();

        a.set_tokens("access", Some("refresh".to_string()));
        assert_eq!(b.get_tokens(), a.get_tokens());
        assert_eq!(b.get_tokens().access_token.as_deref(), Some("access"));
        assert!(a.tokens().same_store(b.tokens()));
    }
}
