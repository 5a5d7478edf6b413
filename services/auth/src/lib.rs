//! Auth façade: token grants and the current account.

mod auth;
pub use auth::{Auth, OnLogin};

mod types;
pub use types::{Account, TokenResponse};
