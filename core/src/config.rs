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
use std::str::FromStr;

use log::warn;

use crate::constants::*;
use crate::utils::Redact;
use crate::{Context, Error, Result};

/// Mode decides how requests are authorized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Player facing client, authorized with bearer tokens.
    #[default]
    Client,
    /// Trusted server, authorized with request signatures.
    Server,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Mode::Client),
            "server" => Ok(Mode::Server),
            v => Err(Error::config_invalid(format!("unknown mode: {v}"))),
        }
    }
}

/// Config carries all the configuration for the remote api.
#[derive(Clone, Default)]
pub struct Config {
    /// `api_base` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ARCADE_API_BASE`]
    pub api_base: Option<String>,
    /// `customer_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ARCADE_CUSTOMER_ID`]
    pub customer_id: Option<String>,
    /// `project_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ARCADE_PROJECT_ID`]
    pub project_id: Option<String>,
    /// `content_hash` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ARCADE_CONTENT_HASH`]
    pub content_hash: Option<String>,
    /// `mode` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ARCADE_MODE`]
    /// - [`Mode::Client`] otherwise
    pub mode: Option<Mode>,
    /// `server_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ARCADE_SERVER_SECRET`]
    pub server_secret: Option<String>,
    /// Service targeted by [`Microservice::Default`](crate::Microservice::Default),
    /// [`DEFAULT_MICROSERVICE`] if unset.
    pub default_microservice: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set api_base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set customer_id
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Set project_id
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set content_hash
    pub fn with_content_hash(mut self, content_hash: impl Into<String>) -> Self {
        self.content_hash = Some(content_hash.into());
        self
    }

    /// Set mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set server_secret
    pub fn with_server_secret(mut self, server_secret: impl Into<String>) -> Self {
        self.server_secret = Some(server_secret.into());
        self
    }

    /// Set default_microservice
    pub fn with_default_microservice(mut self, service: impl Into<String>) -> Self {
        self.default_microservice = Some(service.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(ARCADE_API_BASE) {
            self.api_base.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ARCADE_CUSTOMER_ID) {
            self.customer_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ARCADE_PROJECT_ID) {
            self.project_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ARCADE_CONTENT_HASH) {
            self.content_hash.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ARCADE_SERVER_SECRET) {
            self.server_secret.get_or_insert(v);
        }
        if self.mode.is_none() {
            if let Some(v) = ctx.env_var(ARCADE_MODE) {
                match v.parse() {
                    Ok(mode) => self.mode = Some(mode),
                    Err(err) => warn!("ignore {ARCADE_MODE} from env: {err}"),
                }
            }
        }

        self
    }

    /// Validate the config into [`Settings`].
    pub fn build(self) -> Result<Settings> {
        let api_base = required(self.api_base, "api_base")?;
        let customer_id = required(self.customer_id, "customer_id")?;
        let project_id = required(self.project_id, "project_id")?;
        let mode = self.mode.unwrap_or_default();

        let server_secret = match (mode, self.server_secret) {
            (Mode::Server, Some(secret)) if !secret.is_empty() => Some(secret),
            (Mode::Server, _) => {
                return Err(Error::config_invalid(
                    "server_secret is required in server mode",
                ))
            }
            (Mode::Client, secret) => secret,
        };

        Ok(Settings {
            api_base: api_base.trim_end_matches('/').to_string(),
            customer_id,
            project_id,
            content_hash: self.content_hash.filter(|v| !v.is_empty()),
            mode,
            server_secret,
            default_microservice: self
                .default_microservice
                .unwrap_or_else(|| DEFAULT_MICROSERVICE.to_string()),
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::config_invalid(format!("{name} is required"))),
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base", &self.api_base)
            .field("customer_id", &self.customer_id)
            .field("project_id", &self.project_id)
            .field("content_hash", &self.content_hash)
            .field("mode", &self.mode)
            .field("server_secret", &Redact::from(&self.server_secret))
            .field("default_microservice", &self.default_microservice)
            .finish()
    }
}

/// Settings is the validated, immutable form of [`Config`].
#[derive(Clone)]
pub struct Settings {
    api_base: String,
    customer_id: String,
    project_id: String,
    content_hash: Option<String>,
    mode: Mode,
    server_secret: Option<String>,
    default_microservice: String,
}

impl Settings {
    /// Base url without trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Customer id of the tenant.
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Project id of the tenant.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Content hash used for microservice routing.
    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    /// Authorization mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Server secret, always `Some` in server mode.
    pub fn server_secret(&self) -> Option<&str> {
        self.server_secret.as_deref()
    }

    /// Service targeted by the default microservice route.
    pub fn default_microservice(&self) -> &str {
        &self.default_microservice
    }

    /// Tenant scope: `{customer_id}.{project_id}`.
    pub fn scope(&self) -> String {
        format!("{}.{}", self.customer_id, self.project_id)
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_base", &self.api_base)
            .field("customer_id", &self.customer_id)
            .field("project_id", &self.project_id)
            .field("content_hash", &self.content_hash)
            .field("mode", &self.mode)
            .field("server_secret", &Redact::from(&self.server_secret))
            .field("default_microservice", &self.default_microservice)
            .finish()
    }
}
