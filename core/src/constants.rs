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

//! Header names, protocol constants and environment variables.

/// Header carrying the tenant scope `{customer_id}.{project_id}`.
pub const X_DE_SCOPE: &str = "x-de-scope";
/// Header carrying the server-mode request signature.
pub const X_DE_SIGNATURE: &str = "x-de-signature";
/// Header carrying the impersonated player.
pub const X_DE_GAMERTAG: &str = "x-de-gamertag";

/// Version mixed into every request signature.
pub const SIGNATURE_VERSION: &str = "1";

/// Service name used when a request targets the default microservice.
pub const DEFAULT_MICROSERVICE: &str = "api";

/// Endpoint issuing token pairs for every grant type.
pub const AUTH_TOKEN_PATH: &str = "/basic/auth/token";
/// Endpoint returning the account bound to the bearer token.
pub const ACCOUNT_ME_PATH: &str = "/basic/accounts/me";

// Env values used to build the config.
/// Base url of the remote api.
pub const ARCADE_API_BASE: &str = "ARCADE_API_BASE";
/// Customer id of the tenant.
pub const ARCADE_CUSTOMER_ID: &str = "ARCADE_CUSTOMER_ID";
/// Project id of the tenant.
pub const ARCADE_PROJECT_ID: &str = "ARCADE_PROJECT_ID";
/// Content hash used to route microservice requests.
pub const ARCADE_CONTENT_HASH: &str = "ARCADE_CONTENT_HASH";
/// Server secret, only used in server mode.
pub const ARCADE_SERVER_SECRET: &str = "ARCADE_SERVER_SECRET";
/// `client` or `server`.
pub const ARCADE_MODE: &str = "ARCADE_MODE";
