//! Datasource catalog records.
//!
//! A [`DatasourceInfo`] describes one backing feature layer or table that field
//! references in a dashboard or web application can resolve to. The surrounding
//! item converters build one record per layer (schema, locator metadata and the
//! placeholder base path) and hand the whole catalog to the templating passes.
//!
//! Records are serialized with the camelCase names used by solution templates,
//! so a catalog file is simply a JSON array:
//!
//! ```json
//! [
//!   {
//!     "itemId": "934a9ef8efa7448fa8ddf7b13cef0240",
//!     "layerId": 2,
//!     "url": "{{934a9ef8efa7448fa8ddf7b13cef0240.url}}",
//!     "basePath": "934a9ef8efa7448fa8ddf7b13cef0240.layer2.fields",
//!     "fields": [{ "name": "FACILITYID" }, { "name": "NUMBEDS" }],
//!     "ids": ["TestLayerForDashBoardMap_632"]
//!   }
//! ]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tokio::fs;

use crate::core::TemplatizeError;

/// A field of a layer's schema.
///
/// Only `name` takes part in templatization; everything else the service
/// reported is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            field_type: None,
            extra: Map::new(),
        }
    }
}

impl From<&str> for FieldDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A layer's index within its hosting service.
///
/// Converters normally emit a number, but string ids show up in hand-edited
/// templates and in dashboards that address layers through a web map. Both are
/// accepted and compared strictly (`2` and `"2"` are different ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerId {
    Index(i64),
    Text(String),
}

impl LayerId {
    /// The text spliced into `.layer<id>.` when the id counts as numeric.
    ///
    /// Text ids count as numeric when they are blank or parse as a number,
    /// matching how loosely typed templates have always treated them. The
    /// original text is returned unchanged so the spliced pattern matches what
    /// the converter wrote.
    #[must_use]
    pub fn numeric_text(&self) -> Option<String> {
        match self {
            Self::Index(index) => Some(index.to_string()),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
                    Some(text.clone())
                } else {
                    None
                }
            }
        }
    }

    /// Extract a layer id from an arbitrary JSON value.
    ///
    /// Integral numbers (`2` and `2.0` alike) become [`LayerId::Index`].
    /// Fractional or out-of-range numbers, booleans, `null` and containers
    /// are not layer ids.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(Self::Index),
            Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// Whether a catalog layer id equals the raw `layerId` member of a
    /// reference.
    ///
    /// An absent member only equals an absent catalog id; a member that is
    /// present but not a layer id equals nothing.
    #[must_use]
    pub fn matches_member(catalog: Option<&Self>, member: Option<&Value>) -> bool {
        match (catalog, member) {
            (None, None) => true,
            (Some(id), Some(value)) => Self::from_value(value).as_ref() == Some(id),
            _ => false,
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<i64> for LayerId {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for LayerId {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// One backing layer that field references can be bound to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceInfo {
    /// Item hosting the layer; absent for layers only known inside a web map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<LayerId>,

    /// Feature layer endpoint, usually already templatized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Dotted prefix of every placeholder produced for this layer.
    pub base_path: String,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,

    /// Web map layer ids under which this layer appears.
    #[serde(default)]
    pub ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_layer_info: Option<Value>,

    /// Ids of the objects found to reference this layer, in discovery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl DatasourceInfo {
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    #[must_use]
    pub fn with_layer_id(mut self, layer_id: impl Into<LayerId>) -> Self {
        self.layer_id = Some(layer_id.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldDescriptor>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// `layer_id` as splice text, when present and numeric.
    #[must_use]
    pub fn numeric_layer_id(&self) -> Option<String> {
        self.layer_id.as_ref().and_then(LayerId::numeric_text)
    }

    /// Human-readable label for log lines.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.item_id, &self.layer_id) {
            (Some(item_id), Some(layer_id)) => format!("{item_id}/{layer_id}"),
            (Some(item_id), None) => item_id.clone(),
            _ => self.base_path.clone(),
        }
    }
}

/// Parse a catalog from JSON text.
pub fn parse_catalog(content: &str) -> Result<Vec<DatasourceInfo>, TemplatizeError> {
    let value: Value = serde_json::from_str(content)?;
    if !value.is_array() {
        return Err(TemplatizeError::InvalidCatalog {
            reason: "expected a JSON array of datasource records".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| TemplatizeError::InvalidCatalog {
        reason: e.to_string(),
    })
}

/// Read a catalog file.
pub async fn load_catalog(path: &Path) -> Result<Vec<DatasourceInfo>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read datasource catalog from {}", path.display()))?;

    let catalog = parse_catalog(&content)
        .with_context(|| format!("Failed to parse datasource catalog {}", path.display()))?;

    tracing::debug!("Loaded {} datasource(s) from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Build the settings dictionary that maps each field placeholder back to the
/// field's real name.
///
/// Every `basePath` is split on `.` into nested objects and each field lands at
/// `<basePath>.<lowercase name>.name`. Resolving a template against this
/// dictionary restores the original field names.
#[must_use]
pub fn field_settings(infos: &[DatasourceInfo]) -> Value {
    let mut root = Map::new();

    for info in infos {
        for field in &info.fields {
            let mut segments: Vec<String> = info
                .base_path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect();
            segments.push(field.name.to_lowercase());
            segments.push("name".to_string());

            insert_path(&mut root, &segments, Value::String(field.name.clone()));
        }
    }

    Value::Object(root)
}

fn insert_path(map: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        map.insert(first.clone(), value);
        return;
    }

    let entry = map.entry(first.clone()).or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value);
    }
}
