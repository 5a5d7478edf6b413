use std::sync::Arc;

use arcade_core::{Config, Context, Error, Registry, Result};
use log::debug;
use tokio::sync::OnceCell;

use crate::Session;

/// Arcade is the application-wide entry point.
///
/// It owns the [`Registry`] and memoizes the one [`Session`] built from it.
/// Keep a single `Arcade` for the lifetime of the process, in a `static`
/// or in your application state, and share it by reference.
#[derive(Debug)]
pub struct Arcade {
    registry: Registry,
    session: OnceCell<Arc<Session>>,
}

impl Default for Arcade {
    fn default() -> Self {
        #[cfg(feature = "default-context")]
        let ctx = crate::default_context();
        #[cfg(not(feature = "default-context"))]
        let ctx = Context::new();

        Self::new(ctx)
    }
}

impl Arcade {
    /// Create an unconfigured arcade using the given context.
    pub fn new(ctx: Context) -> Self {
        Self {
            registry: Registry::new(ctx),
            session: OnceCell::new(),
        }
    }

    /// Validate and store the configuration. Succeeds at most once.
    pub fn configure(&self, config: Config) -> Result<()> {
        self.registry.configure(config)
    }

    /// The registry shared with the session.
    ///
    /// Clients and façades built from it share the session's credentials.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Get the session, creating it on first use.
    ///
    /// Concurrent callers all receive the same session. Fails with
    /// [`ErrorKind::NotConfigured`](arcade_core::ErrorKind::NotConfigured)
    /// before [`Arcade::configure`]. The returned session has not
    /// necessarily finished bootstrapping; await [`Session::ready`] first.
    pub async fn session(&self) -> Result<Arc<Session>> {
        self.session
            .get_or_try_init(|| async {
                let client = self.registry.client()?;
                debug!("creating session in {:?} mode", client.mode());
                Ok::<_, Error>(Session::new(client))
            })
            .await
            .cloned()
    }

    /// Drop the memoized session so the next [`Arcade::session`] builds a
    /// fresh one. Settings and stored tokens are kept.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset(&mut self) {
        self.session.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::ErrorKind;
    use pretty_assertions::assert_eq;

    fn configured() -> Arcade {
        let arcade = Arcade::new(Context::new());
        arcade
            .configure(
                Config::new()
                    .with_api_base("https://api.example.com")
                    .with_customer_id("DE_123")
                    .with_project_id("pid"),
            )
            .unwrap();
        arcade
    }

    #[tokio::test]
    async fn test_session_before_configure() {
        let arcade = Arcade::new(Context::new());

        let err = arcade.session().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
    }

    #[tokio::test]
    async fn test_session_is_memoized() {
        let arcade = configured();

        let (a, b) = tokio::join!(arcade.session(), arcade.session());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &arcade.session().await.unwrap()));
    }

    #[tokio::test]
    async fn test_reset() {
        let mut arcade = configured();
        let before = arcade.session().await.unwrap();
        arcade.registry().tokens().set("access", None);

        arcade.reset();

        let after = arcade.session().await.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.client().tokens().same_store(before.client().tokens()));
        assert_eq!(after.state(), crate::BootstrapState::Uninitialized);
    }
}
