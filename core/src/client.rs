use std::sync::Arc;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::constants::{X_DE_GAMERTAG, X_DE_SCOPE};
use crate::{
    Context, Error, Microservice, Mode, RequestOptions, RequestSigner, Result, Settings,
    TokenStore, Tokens,
};

/// Client is the single gateway to the remote api.
///
/// Every call builds the url, applies the tenant scope, authorizes the
/// request according to the configured [`Mode`] and normalizes failures.
/// Clients are cheap to clone; clones share settings and credential state.
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    settings: Arc<Settings>,
    tokens: TokenStore,
    signer: Option<RequestSigner>,
}

impl Client {
    /// Create a client on top of the given credential store.
    ///
    /// Prefer [`Registry::client`](crate::Registry::client), which hands out
    /// clients sharing the registry's store.
    pub fn new(ctx: Context, settings: Arc<Settings>, tokens: TokenStore) -> Self {
        let signer = match (settings.mode(), settings.server_secret()) {
            (Mode::Server, Some(secret)) => {
                Some(RequestSigner::new(secret, settings.project_id()))
            }
            _ => None,
        };

        Self {
            ctx,
            settings,
            tokens,
            signer,
        }
    }

    /// Settings this client was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Authorization mode.
    pub fn mode(&self) -> Mode {
        self.settings.mode()
    }

    /// The shared credential store.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Store a token pair, see [`TokenStore::set`].
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
        self.tokens.set(access_token, refresh_token)
    }

    /// Read the current token pair.
    pub fn get_tokens(&self) -> Tokens {
        self.tokens.get()
    }

    /// Build the url for `path`.
    ///
    /// Microservice requests are routed through
    /// `/basic/{customer_id}.{project_id}.{content_hash}micro_{service}{path}`.
    pub fn url(&self, path: &str, microservice: Option<&Microservice>) -> String {
        let base = self.settings.api_base();
        match microservice {
            None => format!("{base}{path}"),
            Some(target) => {
                let service = match target {
                    Microservice::Default => self.settings.default_microservice(),
                    Microservice::Named(name) => name.as_str(),
                };
                format!(
                    "{base}/basic/{}.{}.{}micro_{service}{path}",
                    self.settings.customer_id(),
                    self.settings.project_id(),
                    self.settings.content_hash().unwrap_or_default(),
                )
            }
        }
    }

    /// Send a request and decode the JSON response.
    ///
    /// - `path` must start with `/`.
    /// - `body` is serialized as JSON and only sent for non-GET methods.
    ///
    /// A non-success status fails with [`ErrorKind::Api`](crate::ErrorKind::Api)
    /// carrying the JSON error body, or `{"status": <code>}` when the body is
    /// not JSON. There are no retries.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        opts: RequestOptions,
    ) -> Result<T> {
        if !path.starts_with('/') {
            return Err(Error::validation(format!(
                "request path must start with '/': {path}"
            )));
        }

        let url = self.url(path, opts.microservice.as_ref());
        let body = if method == Method::GET {
            None
        } else {
            body.map(|v| serde_json::to_string(&v)).transpose()?
        };

        let (mut parts, ()) = http::Request::builder()
            .method(method)
            .uri(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(X_DE_SCOPE, self.settings.scope())
            .body(())?
            .into_parts();

        match self.settings.mode() {
            Mode::Client => {
                if opts.requires_auth {
                    if let Some(token) = self.tokens.access_token() {
                        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                        value.set_sensitive(true);
                        parts.headers.insert(AUTHORIZATION, value);
                    }
                }
            }
            Mode::Server => {
                let signer = self.signer.as_ref().ok_or_else(|| {
                    Error::config_invalid("server mode requires a server secret")
                })?;
                signer.sign(&mut parts, body.as_deref())?;
            }
        }

        if let Some(gamertag) = &opts.impersonate_as {
            parts
                .headers
                .insert(X_DE_GAMERTAG, HeaderValue::from_str(gamertag)?);
        }

        debug!("sending {} {}", parts.method, url);
        let req = http::Request::from_parts(parts, body.map(Bytes::from).unwrap_or_default());
        let (parts, bs) = self.ctx.http_send(req).await?.into_parts();
        debug!("got response {} from {}", parts.status, url);

        if !parts.status.is_success() {
            let payload = serde_json::from_slice::<Value>(&bs)
                .unwrap_or_else(|_| json!({ "status": parts.status.as_u16() }));
            return Err(Error::api(parts.status, payload));
        }

        let bs: &[u8] = if bs.is_empty() { b"null" } else { &bs };
        serde_json::from_slice(bs).map_err(|e| {
            Error::unexpected(format!("failed to decode response from {url}")).with_source(e)
        })
    }

    /// Same as [`Client::request`], routed to the named microservice.
    pub async fn request_to_microservice<T: DeserializeOwned>(
        &self,
        service: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
        opts: RequestOptions,
    ) -> Result<T> {
        let opts = opts.with_microservice(service);
        self.request(method, path, body, opts).await
    }
}
