//! Server mode request signing.

use std::fmt::{Debug, Formatter};

use http::{HeaderValue, Method};
use log::debug;

use crate::constants::{SIGNATURE_VERSION, X_DE_SIGNATURE};
use crate::hash::base64_md5;
use crate::utils::Redact;
use crate::Result;

/// Compute the request signature.
///
/// ## Format
///
/// ```text
/// base64(md5(secret + project_id + "1" + path_and_query + body))
/// ```
///
/// `body` is left out for `DELETE` requests, and when there is none.
pub fn sign(
    secret: &str,
    project_id: &str,
    path_and_query: &str,
    body: Option<&str>,
    method: &Method,
) -> String {
    let mut s = String::with_capacity(
        secret.len()
            + project_id.len()
            + SIGNATURE_VERSION.len()
            + path_and_query.len()
            + body.map_or(0, str::len),
    );
    s.push_str(secret);
    s.push_str(project_id);
    s.push_str(SIGNATURE_VERSION);
    s.push_str(path_and_query);
    if let Some(body) = body {
        if *method != Method::DELETE {
            s.push_str(body);
        }
    }

    base64_md5(s.as_bytes())
}

/// RequestSigner attaches `X-DE-SIGNATURE` to outgoing requests.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
    project_id: String,
}

impl RequestSigner {
    /// Create a signer for the given secret and project.
    pub fn new(secret: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            project_id: project_id.into(),
        }
    }

    /// Sign the request parts with the serialized body that will be sent.
    pub fn sign(&self, parts: &mut http::request::Parts, body: Option<&str>) -> Result<()> {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|v| v.as_str())
            .unwrap_or("/");

        debug!(
            "signing {} {} with body of {} bytes",
            parts.method,
            path_and_query,
            body.map_or(0, str::len)
        );
        let signature = sign(
            &self.secret,
            &self.project_id,
            path_and_query,
            body,
            &parts.method,
        );

        let mut value = HeaderValue::from_str(&signature)?;
        value.set_sensitive(true);
        parts.headers.insert(X_DE_SIGNATURE, value);
        Ok(())
    }
}

impl Debug for RequestSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &Redact::from(&self.secret))
            .field("project_id", &self.project_id)
            .finish()
    }
}
