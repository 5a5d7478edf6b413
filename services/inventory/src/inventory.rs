use std::collections::BTreeMap;

use arcade_core::{Client, Error, Mode, RequestOptions, Result};
use http::Method;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CURRENCY_PREFIX: &str = "currency.";
const ITEM_PREFIX: &str = "items.";

/// Item owned by a player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Instance id, unique within the inventory.
    pub id: String,
    /// Content id of the item definition, like `items.sword`.
    pub content_id: String,
    /// Per instance properties such as level or durability.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Snapshot of a player inventory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InventoryView {
    /// Balance per currency id.
    #[serde(default)]
    pub currencies: BTreeMap<String, i64>,
    /// Owned item instances.
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

impl InventoryView {
    /// Balance of a currency, zero when the player never held it.
    pub fn currency(&self, currency_id: &str) -> i64 {
        self.currencies.get(currency_id).copied().unwrap_or_default()
    }

    /// Items created from the given content id.
    pub fn items_of<'a>(&'a self, content_id: &'a str) -> impl Iterator<Item = &'a InventoryItem> {
        self.items.iter().filter(move |i| i.content_id == content_id)
    }
}

/// Item to grant in an [`InventoryUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    content_id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    properties: Map<String, Value>,
}

impl NewItem {
    /// Grant one item of `content_id`, which must start with `items.`.
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            properties: Map::new(),
        }
    }

    /// Attach a property to the granted item.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Changes applied atomically by [`Inventory::update`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    currencies: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    new_items: Vec<NewItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    delete_items: Vec<String>,
    /// Currency whose accumulated delta left the `i64` range.
    #[serde(skip)]
    overflowed: Option<String>,
}

impl InventoryUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a currency balance by `delta`, which may be negative.
    ///
    /// Deltas for the same currency accumulate.
    pub fn currency(mut self, currency_id: impl Into<String>, delta: i64) -> Self {
        let currency_id = currency_id.into();
        let total = self.currencies.entry(currency_id.clone()).or_default();
        match total.checked_add(delta) {
            Some(sum) => *total = sum,
            None => self.overflowed = Some(currency_id),
        }
        self
    }

    /// Grant a new item.
    pub fn add_item(mut self, item: NewItem) -> Self {
        self.new_items.push(item);
        self
    }

    /// Remove an owned item by its instance id.
    pub fn delete_item(mut self, item_id: impl Into<String>) -> Self {
        self.delete_items.push(item_id.into());
        self
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty() && self.new_items.is_empty() && self.delete_items.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("inventory update is empty"));
        }
        if let Some(id) = &self.overflowed {
            return Err(Error::validation(format!(
                "accumulated delta of currency {id} overflows"
            )));
        }
        if let Some(id) = self
            .currencies
            .keys()
            .find(|id| !has_id_prefix(id, CURRENCY_PREFIX))
        {
            return Err(Error::validation(format!(
                "currency id must start with {CURRENCY_PREFIX}: {id}"
            )));
        }
        if let Some(item) = self
            .new_items
            .iter()
            .find(|item| !has_id_prefix(&item.content_id, ITEM_PREFIX))
        {
            return Err(Error::validation(format!(
                "item content id must start with {ITEM_PREFIX}: {}",
                item.content_id
            )));
        }
        if self.delete_items.iter().any(|id| id.is_empty()) {
            return Err(Error::validation("deleted item id must not be empty"));
        }
        Ok(())
    }
}

fn has_id_prefix(id: &str, prefix: &str) -> bool {
    id.len() > prefix.len() && id.starts_with(prefix)
}

/// Inventory reads and updates player inventories.
#[derive(Debug, Clone)]
pub struct Inventory {
    client: Client,
}

impl Inventory {
    /// Create an inventory façade on top of `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the inventory of a player, optionally limited to a scope such
    /// as `currency` or `items.weapons`.
    pub async fn get(&self, player_id: i64, scope: Option<&str>) -> Result<InventoryView> {
        let mut path = inventory_path(player_id);
        if let Some(scope) = scope {
            if scope.is_empty() {
                return Err(Error::validation("inventory scope must not be empty"));
            }
            path.push_str("?scope=");
            path.extend(utf8_percent_encode(scope, NON_ALPHANUMERIC));
        }

        self.client
            .request(Method::GET, &path, None, self.options(player_id))
            .await
    }

    /// Apply an update and return the inventory afterwards.
    pub async fn update(&self, player_id: i64, update: InventoryUpdate) -> Result<InventoryView> {
        update.validate()?;

        self.client
            .request(
                Method::PUT,
                &inventory_path(player_id),
                Some(serde_json::to_value(&update)?),
                self.options(player_id),
            )
            .await
    }

    fn options(&self, player_id: i64) -> RequestOptions {
        let opts = RequestOptions::new().with_auth();
        match self.client.mode() {
            Mode::Client => opts,
            Mode::Server => opts.impersonate_as(player_id.to_string()),
        }
    }
}

fn inventory_path(player_id: i64) -> String {
    format!("/object/inventory/{player_id}/")
}
