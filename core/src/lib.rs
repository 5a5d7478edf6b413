//! Core components of the arcade game backend client.
//!
//! ## Overview
//!
//! - **Context**: holds the pluggable http transport and environment access.
//! - **Registry**: owns the once-only settings and the credential store
//!   shared by every client.
//! - **Client**: the single gateway to the remote api. It scopes, signs
//!   (server mode) or authorizes (client mode) every request.
//! - **sign**: the deterministic server-mode request signature.
//!
//! ## Example
//!
//! ```no_run
//! use arcade_core::{Config, Context, Mode, Registry, RequestOptions};
//! use http::Method;
//! use serde_json::Value;
//!
//! # async fn example() -> arcade_core::Result<()> {
//! let registry = Registry::new(Context::new());
//! registry.configure(
//!     Config::new()
//!         .with_api_base("https://api.example.com")
//!         .with_customer_id("DE_123")
//!         .with_project_id("DE_123456")
//!         .with_mode(Mode::Server)
//!         .with_server_secret("server-secret"),
//! )?;
//!
//! let client = registry.client()?;
//! let stats: Value = client
//!     .request(
//!         Method::GET,
//!         "/object/stats/game.private.player.42/",
//!         None,
//!         RequestOptions::new().impersonate_as("42"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod constants;
pub mod hash;
pub mod sign;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};
mod config;
pub use config::{Config, Mode, Settings};
mod credential;
pub use credential::{TokenStore, Tokens};
mod options;
pub use options::{Microservice, RequestOptions};
pub use sign::RequestSigner;
mod client;
pub use client::Client;
mod registry;
pub use registry::Registry;
