//! Web application conversion.
//!
//! Configurable apps keep their settings under `values`, where field bundles
//! are often keyed by web map layer id:
//!
//! ```json
//! {"values": {"searchLayers": {"Hospitals_5140": {"fields": ["NAME"]}}}}
//! ```
//!
//! That subtree is templatized with key templatization on. Everything else in
//! the item data is templatized with keys left alone.

use serde_json::{Map, Value};

use crate::core::Result;
use crate::datasource::DatasourceInfo;
use crate::templating::Templatizer;

/// Member of the app data holding the configurable values.
pub const VALUES_KEY: &str = "values";

/// Templatize the field references of a web application's item data.
///
/// Non-object data is templatized as a whole with keys off.
pub fn templatize_web_application(
    data: &Value,
    infos: &[DatasourceInfo],
    templatizer: &Templatizer,
) -> Result<Value> {
    let keyed = templatizer.with_templatize_keys(true);
    let plain = templatizer.with_templatize_keys(false);

    let Value::Object(members) = data else {
        return plain.templatize_object(data, infos);
    };

    let mut result = Map::with_capacity(members.len());
    for (key, member) in members {
        let templatized = if key == VALUES_KEY {
            tracing::debug!("Templatizing web application values");
            keyed.templatize_object(member, infos)?
        } else {
            plain.templatize_object(member, infos)?
        };
        result.insert(key.clone(), templatized);
    }

    Ok(Value::Object(result))
}
