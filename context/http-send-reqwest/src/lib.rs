//! [`HttpSend`] implementation backed by [`reqwest`].

use arcade_core::{Error, HttpSend, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Request};

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
///
/// Connection level failures are reported as transport errors with the
/// reqwest error as source. Responses are returned whatever their status.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req).map_err(|e| {
            Error::validation("failed to convert request for reqwest").with_source(e)
        })?;
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport(e.to_string()).with_source(e))?;

        let mut builder = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(resp.headers().clone());
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::transport(e.to_string()).with_source(e))?;

        Ok(builder.body(body)?)
    }
}
