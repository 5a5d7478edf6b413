/// Microservice a request is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Microservice {
    /// The service configured as `default_microservice`.
    Default,
    /// A service by name.
    Named(String),
}

/// Per request options of [`Client::request`](crate::Client::request).
///
/// The default value sends an unauthenticated request straight to
/// `api_base` without impersonation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Attach the bearer token in client mode. Defaults to `false`.
    ///
    /// Has no effect in server mode, where every request is signed.
    pub requires_auth: bool,
    /// Route the request through a microservice. Defaults to `None`.
    pub microservice: Option<Microservice>,
    /// Act on behalf of this player via `X-DE-GAMERTAG`. Defaults to `None`.
    pub impersonate_as: Option<String>,
}

impl RequestOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require authorization.
    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Route through the default microservice.
    pub fn with_default_microservice(mut self) -> Self {
        self.microservice = Some(Microservice::Default);
        self
    }

    /// Route through the named microservice.
    pub fn with_microservice(mut self, service: impl Into<String>) -> Self {
        self.microservice = Some(Microservice::Named(service.into()));
        self
    }

    /// Impersonate the given player.
    pub fn impersonate_as(mut self, gamertag: impl Into<String>) -> Self {
        self.impersonate_as = Some(gamertag.into());
        self
    }
}
