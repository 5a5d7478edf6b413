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
use std::sync::{Arc, Mutex};

use crate::utils::Redact;

/// Tokens holds the bearer token pair issued by the auth endpoint.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Tokens {
    /// Access token attached as `Authorization: Bearer` in client mode.
    pub access_token: Option<String>,
    /// Refresh token used to obtain a new access token.
    pub refresh_token: Option<String>,
}

impl Debug for Tokens {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &Redact::from(&self.access_token))
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .finish()
    }
}

/// TokenStore is the credential slot shared by every client of a registry.
///
/// Cloning a `TokenStore` yields a handle to the same slot. It also owns the
/// login gate that serializes token issuing flows so that the identity
/// fetched after a login always matches the tokens stored last.
#[derive(Clone, Default)]
pub struct TokenStore {
    tokens: Arc<Mutex<Tokens>>,
    login: Arc<tokio::sync::Mutex<()>>,
}

impl TokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new access token.
    ///
    /// The refresh token is only replaced when a new one is given, refresh
    /// flows are allowed to skip rotation.
    pub fn set(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
        let mut tokens = self.tokens.lock().expect("lock poisoned");
        tokens.access_token = Some(access_token.into());
        if let Some(refresh_token) = refresh_token {
            tokens.refresh_token = Some(refresh_token);
        }
    }

    /// Get a snapshot of the current tokens.
    pub fn get(&self) -> Tokens {
        self.tokens.lock().expect("lock poisoned").clone()
    }

    /// Get the current access token.
    pub fn access_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .expect("lock poisoned")
            .access_token
            .clone()
    }

    /// Drop both tokens.
    pub fn clear(&self) {
        *self.tokens.lock().expect("lock poisoned") = Tokens::default();
    }

    /// Acquire the login gate.
    ///
    /// Holders run `issue tokens -> store -> fetch identity` without another
    /// login interleaving. The gate is not reentrant.
    pub async fn lock_login(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.login.lock().await
    }

    /// Check whether two handles point to the same slot.
    pub fn same_store(&self, other: &TokenStore) -> bool {
        Arc::ptr_eq(&self.tokens, &other.tokens)
    }
}

impl Debug for TokenStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("tokens", &self.get())
            .finish()
    }
}
