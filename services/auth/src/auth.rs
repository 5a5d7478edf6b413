// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};
use std::sync::Weak;

use arcade_core::constants::{ACCOUNT_ME_PATH, AUTH_TOKEN_PATH};
use arcade_core::{Client, Error, RequestOptions, Result};
use async_trait::async_trait;
use http::Method;
use log::debug;

use crate::types::Grant;
use crate::{Account, TokenResponse};

/// OnLogin is notified after a login stored new tokens.
///
/// The session implements it to refresh the current identity. It runs
/// while the login gate is held, implementations must not log in again.
#[async_trait]
pub trait OnLogin: Send + Sync + 'static {
    /// Called once per successful login.
    async fn on_login(&self);
}

/// Auth issues token pairs and reads the current account.
///
/// Every login stores the issued tokens in the client's shared
/// [`TokenStore`](arcade_core::TokenStore) and then notifies the
/// [`OnLogin`] hook, if any. Logins sharing a store are serialized.
#[derive(Clone)]
pub struct Auth {
    client: Client,
    hook: Option<Weak<dyn OnLogin>>,
}

impl Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("client", &self.client)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Auth {
    /// Create a standalone auth façade without login hook.
    pub fn new(client: Client) -> Self {
        Self { client, hook: None }
    }

    /// Create an auth façade that notifies `hook` after each login.
    pub fn with_hook(client: Client, hook: Weak<dyn OnLogin>) -> Self {
        Self {
            client,
            hook: Some(hook),
        }
    }

    /// Log in as a new guest account.
    pub async fn guest_login(&self) -> Result<TokenResponse> {
        self.login_with(Grant::Guest).await
    }

    /// Log in with username and password.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        require("username", username)?;
        require("password", password)?;
        self.login_with(Grant::Password { username, password })
            .await
    }

    /// Log in with a device id.
    pub async fn device_login(&self, device_id: &str) -> Result<TokenResponse> {
        require("device_id", device_id)?;
        self.login_with(Grant::Device { device_id }).await
    }

    /// Log in with a token issued by a third party such as `google` or `apple`.
    pub async fn third_party_login(&self, provider: &str, token: &str) -> Result<TokenResponse> {
        require("provider", provider)?;
        require("token", token)?;
        self.login_with(Grant::ThirdParty {
            third_party: provider,
            token,
        })
        .await
    }

    /// Log in through a federated identity microservice.
    pub async fn external_login(
        &self,
        external_token: &str,
        provider_service: &str,
        provider_namespace: &str,
    ) -> Result<TokenResponse> {
        require("external_token", external_token)?;
        require("provider_service", provider_service)?;
        require("provider_namespace", provider_namespace)?;
        self.login_with(Grant::External {
            external_token,
            provider_service,
            provider_namespace,
        })
        .await
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self) -> Result<TokenResponse> {
        let refresh_token = self
            .client
            .get_tokens()
            .refresh_token
            .ok_or_else(|| Error::validation("no refresh token stored"))?;

        self.login_with(Grant::RefreshToken {
            refresh_token: &refresh_token,
        })
        .await
    }

    /// Create an anonymous session and store its tokens.
    ///
    /// Unlike [`Auth::guest_login`] this neither takes the login gate nor
    /// fires the hook; the bootstrap calls it while holding the gate.
    pub async fn create_anonymous(&self) -> Result<TokenResponse> {
        self.issue(Grant::Guest).await
    }

    /// Fetch the account of the current bearer token.
    pub async fn me(&self) -> Result<Account> {
        self.client
            .request(
                Method::GET,
                ACCOUNT_ME_PATH,
                None,
                RequestOptions::new().with_auth(),
            )
            .await
    }

    async fn login_with(&self, grant: Grant<'_>) -> Result<TokenResponse> {
        let _guard = self.client.tokens().lock_login().await;
        let resp = self.issue(grant).await?;

        if let Some(hook) = self.hook.as_ref().and_then(Weak::upgrade) {
            hook.on_login().await;
        }
        Ok(resp)
    }

    async fn issue(&self, grant: Grant<'_>) -> Result<TokenResponse> {
        debug!("requesting tokens with grant {}", grant.name());
        let body = serde_json::to_value(&grant)?;
        let resp: TokenResponse = self
            .client
            .request(Method::POST, AUTH_TOKEN_PATH, Some(body), RequestOptions::new())
            .await?;

        self.client
            .set_tokens(resp.access_token.clone(), resp.refresh_token.clone());
        Ok(resp)
    }
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{name} must not be empty")));
    }
    Ok(())
}
