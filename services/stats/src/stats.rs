use std::collections::BTreeMap;
use std::fmt;

use arcade_core::{Client, Error, Mode, RequestOptions, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Visibility of a stats object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Readable by every player.
    Public,
    /// Readable by the owner and servers only.
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("public"),
            Access::Private => f.write_str("private"),
        }
    }
}

/// Changes applied by [`Stats::update`].
///
/// `set` overwrites values, `add` increments numeric values by the given
/// delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsUpdate {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    set: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    add: BTreeMap<String, String>,
}

impl StatsUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite `key` with `value`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set.insert(key.into(), value.into());
        self
    }

    /// Increment `key` by `delta`, which must be numeric.
    pub fn add(mut self, key: impl Into<String>, delta: impl Into<String>) -> Self {
        self.add.insert(key.into(), delta.into());
        self
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("stats update is empty"));
        }
        if self.set.keys().chain(self.add.keys()).any(|k| k.is_empty()) {
            return Err(Error::validation("stat key must not be empty"));
        }
        for (key, delta) in &self.add {
            let numeric = delta.trim().parse::<f64>().is_ok_and(f64::is_finite);
            if !numeric {
                return Err(Error::validation(format!(
                    "increment of stat {key} is not numeric: {delta}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct StatsResponse {
    #[serde(default)]
    stats: BTreeMap<String, Value>,
}

/// Stats reads and writes player statistics.
#[derive(Debug, Clone)]
pub struct Stats {
    client: Client,
}

impl Stats {
    /// Create a stats façade on top of `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch all stats of a player.
    pub async fn get(&self, player_id: i64, access: Access) -> Result<BTreeMap<String, String>> {
        let resp: StatsResponse = self
            .client
            .request(
                Method::GET,
                &stats_path(player_id, access),
                None,
                self.options(player_id),
            )
            .await?;

        Ok(resp
            .stats
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => (k, s),
                v => (k, v.to_string()),
            })
            .collect())
    }

    /// Apply an update to the stats of a player.
    pub async fn update(&self, player_id: i64, access: Access, update: StatsUpdate) -> Result<()> {
        update.validate()?;

        let _: Value = self
            .client
            .request(
                Method::POST,
                &stats_path(player_id, access),
                Some(serde_json::to_value(&update)?),
                self.options(player_id),
            )
            .await?;
        Ok(())
    }

    fn options(&self, player_id: i64) -> RequestOptions {
        let opts = RequestOptions::new().with_auth();
        match self.client.mode() {
            Mode::Client => opts,
            Mode::Server => opts.impersonate_as(player_id.to_string()),
        }
    }
}

fn stats_path(player_id: i64, access: Access) -> String {
    format!("/object/stats/game.{access}.player.{player_id}/client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::constants::X_DE_GAMERTAG;
    use arcade_core::{Config, Context, ErrorKind, HttpSend, Registry};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct MockHttpSend {
        body: &'static str,
        sent: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    }

    impl MockHttpSend {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                sent: Arc::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.sent.lock().unwrap().push(req);
            Ok(http::Response::new(Bytes::from_static(self.body.as_bytes())))
        }
    }

    fn stats(http: &MockHttpSend, mode: Mode) -> Stats {
        let registry = Registry::new(Context::new().with_http_send(http.clone()));
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
        Stats::new(registry.client().unwrap())
    }

    #[tokio::test]
    async fn test_get() -> anyhow::Result<()> {
        let http = MockHttpSend::new(r#"{"id":42,"stats":{"level":"3","wins":7}}"#);
        let stats = stats(&http, Mode::Client);

        let values = stats.get(42, Access::Public).await?;
        assert_eq!(values.get("level").map(String::as_str), Some("3"));
        assert_eq!(values.get("wins").map(String::as_str), Some("7"));

        let sent = http.sent.lock().unwrap();
        assert_eq!(
            sent[0].uri().to_string(),
            "https://api.example.com/object/stats/game.public.player.42/client"
        );
        assert!(sent[0].headers().get(X_DE_GAMERTAG).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_in_server_mode() -> anyhow::Result<()> {
        let http = MockHttpSend::new("{}");
        let stats = stats(&http, Mode::Server);

        stats
            .update(
                42,
                Access::Private,
                StatsUpdate::new().set("title", "champion").add("wins", "1"),
            )
            .await?;

        let sent = http.sent.lock().unwrap();
        assert_eq!(sent[0].method(), &Method::POST);
        assert_eq!(sent[0].headers()[X_DE_GAMERTAG], "42");
        assert_eq!(
            serde_json::from_slice::<Value>(sent[0].body())?,
            json!({"set": {"title": "champion"}, "add": {"wins": "1"}})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_validation() {
        let http = MockHttpSend::new("{}");
        let stats = stats(&http, Mode::Client);

        for update in [
            StatsUpdate::new(),
            StatsUpdate::new().add("wins", "one"),
            StatsUpdate::new().add("wins", "NaN"),
            StatsUpdate::new().add("wins", "inf"),
            StatsUpdate::new().add("wins", "-infinity"),
            StatsUpdate::new().set("", "x"),
        ] {
            let err = stats.update(42, Access::Public, update).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(http.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fractional_and_negative_increments() {
        let update = StatsUpdate::new().add("xp", " 1.5 ").add("lives", "-1");
        assert!(update.validate().is_ok());
    }
}
