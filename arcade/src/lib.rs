#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use arcade_core::*;

mod arcade;
pub use crate::arcade::Arcade;
mod session;
pub use session::{BootstrapState, Session};

pub mod auth {
    pub use arcade_auth::*;
}

pub mod stats {
    pub use arcade_stats::*;
}

pub mod inventory {
    pub use arcade_inventory::*;
}

pub mod content {
    pub use arcade_content::*;
}

/// Create a context that sends requests with reqwest and reads the process
/// environment.
#[cfg(feature = "default-context")]
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(arcade_http_send_reqwest::ReqwestHttpSend::default())
        .with_env(OsEnv)
}
