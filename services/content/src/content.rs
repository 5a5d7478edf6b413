use arcade_core::{Client, Error, RequestOptions, Result};
use http::Method;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One published piece of content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    /// Id like `items.sword`, unique within its manifest.
    pub content_id: String,
    /// Published version of the entry.
    #[serde(default)]
    pub version: Option<String>,
    /// Location of the payload, when it is not inlined.
    #[serde(default)]
    pub uri: Option<String>,
    /// Free form labels set by the publisher.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Inline payload and fields this crate does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A published content manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentManifest {
    /// Manifest id, like `global`.
    pub id: String,
    /// Published entries, in manifest order.
    #[serde(default)]
    pub entries: Vec<ContentEntry>,
}

impl ContentManifest {
    /// Find an entry by content id.
    pub fn entry(&self, content_id: &str) -> Option<&ContentEntry> {
        self.entries.iter().find(|e| e.content_id == content_id)
    }
}

/// Content reads public content manifests.
#[derive(Debug, Clone)]
pub struct Content {
    client: Client,
}

impl Content {
    /// Create a content façade on top of `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a public manifest by id.
    pub async fn manifest(&self, manifest_id: &str) -> Result<ContentManifest> {
        if manifest_id.is_empty() {
            return Err(Error::validation("manifest id must not be empty"));
        }

        let path = format!(
            "/basic/content/manifest/public?id={}",
            utf8_percent_encode(manifest_id, NON_ALPHANUMERIC)
        );
        self.client
            .request(Method::GET, &path, None, RequestOptions::new().with_auth())
            .await
    }

    /// Fetch a manifest and pick one entry out of it.
    pub async fn entry(&self, manifest_id: &str, content_id: &str) -> Result<Option<ContentEntry>> {
        if content_id.is_empty() {
            return Err(Error::validation("content id must not be empty"));
        }

        let manifest = self.manifest(manifest_id).await?;
        Ok(manifest.entry(content_id).cloned())
    }
}
