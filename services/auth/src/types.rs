use std::fmt::{Debug, Formatter};

use arcade_core::utils::Redact;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the token endpoint, one variant per grant type.
#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub(crate) enum Grant<'a> {
    Guest,
    Password {
        username: &'a str,
        password: &'a str,
    },
    Device {
        device_id: &'a str,
    },
    ThirdParty {
        third_party: &'a str,
        token: &'a str,
    },
    External {
        external_token: &'a str,
        provider_service: &'a str,
        provider_namespace: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
    },
}

impl Grant<'_> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Grant::Guest => "guest",
            Grant::Password { .. } => "password",
            Grant::Device { .. } => "device",
            Grant::ThirdParty { .. } => "third_party",
            Grant::External { .. } => "external",
            Grant::RefreshToken { .. } => "refresh_token",
        }
    }
}

/// Token pair issued by the auth endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for client mode requests.
    pub access_token: String,
    /// Refresh token, absent when the grant does not rotate it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in milliseconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Usually `access`.
    #[serde(default)]
    pub token_type: Option<String>,
}

impl Debug for TokenResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &Redact::from(&self.access_token))
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Account bound to the current bearer token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    /// Player id.
    pub id: i64,
    /// Email of a registered account, absent for guests.
    #[serde(default)]
    pub email: Option<String>,
    /// Scopes granted to the token.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Fields this crate does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
