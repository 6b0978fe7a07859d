//! Prioritized parent rewriting.
//!
//! Widgets usually keep a layer reference right next to the field names that
//! belong to it: a layer url beside a `fields` list, a web map layer id beside
//! a `valueField`. Before the general ranked pass, these walkers look for such
//! references and rewrite the whole object that contains them with the
//! matching layer's fields.
//!
//! Both walkers return a new value. `null` leaves are copied through and
//! scalar leaves are tested by their text (`42`, `true`, ...).
//!
//! A matching object is rewritten once all of its members have been walked,
//! so every member sees the rewrite, including the ones before the matching
//! leaf.
//!
//! With keys enabled, a member whose key is the web map layer id is rewritten
//! whatever its value: `{"Hospitals_5140": "NAME"}` turns the scalar `NAME`
//! into a placeholder just like a nested bundle would be.

use regex::Regex;
use serde_json::{Map, Value};

use super::fields::templatize_field_references;
use super::pattern::{self, PatternMode};
use crate::core::Result;
use crate::datasource::DatasourceInfo;

/// Rewrite every object holding a leaf that contains the layer-qualified url of
/// `info`.
///
/// Nothing happens unless `info` has both a url and a numeric layer id.
pub fn templatize_parent_by_url(
    value: &Value,
    info: &DatasourceInfo,
    templatize_keys: bool,
    mode: PatternMode,
) -> Result<Value> {
    let Some(layer_url) = pattern::layer_url_pattern(info, mode)? else {
        return Ok(value.clone());
    };

    let walker = ParentWalker {
        info,
        pattern: &layer_url,
        templatize_keys,
    };
    Ok(walker.by_url(value))
}

/// Rewrite every object holding a leaf (or, with `templatize_keys`, a key)
/// that contains the web map layer id `id`.
///
/// Strings holding a serialized JSON object or array are walked too and
/// written back serialized.
pub fn templatize_parent_by_web_map_layer_id(
    value: &Value,
    info: &DatasourceInfo,
    id: &str,
    templatize_keys: bool,
    mode: PatternMode,
) -> Result<Value> {
    let id_pattern = pattern::compile(id, mode)?;

    let walker = ParentWalker {
        info,
        pattern: &id_pattern,
        templatize_keys,
    };
    walker.by_web_map_layer_id(value)
}

struct ParentWalker<'a> {
    info: &'a DatasourceInfo,
    pattern: &'a Regex,
    templatize_keys: bool,
}

impl ParentWalker<'_> {
    fn rewrite(&self, value: &Value) -> Value {
        templatize_field_references(
            value,
            &self.info.fields,
            &self.info.base_path,
            self.templatize_keys,
        )
    }

    fn leaf_matches(&self, value: &Value) -> bool {
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return false,
        };
        self.pattern.is_match(&text)
    }

    /// Close out an object walk: rewrite the copy when one of its leaves matched.
    fn finish(&self, clone: Map<String, Value>, matched: bool) -> Value {
        let clone = Value::Object(clone);
        if matched {
            tracing::trace!("Templatizing parent object for {}", self.info.label());
            self.rewrite(&clone)
        } else {
            clone
        }
    }

    fn by_url(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|item| self.by_url(item)).collect()),
            Value::Object(map) => {
                let mut clone = Map::with_capacity(map.len());
                let mut matched = false;

                for (key, child) in map {
                    if child.is_object() || child.is_array() {
                        clone.insert(key.clone(), self.by_url(child));
                    } else {
                        matched |= self.leaf_matches(child);
                        clone.insert(key.clone(), child.clone());
                    }
                }

                self.finish(clone, matched)
            }
            _ => value.clone(),
        }
    }

    fn by_web_map_layer_id(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.by_web_map_layer_id(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut clone = Map::with_capacity(map.len());
                let mut matched = false;

                for (key, child) in map {
                    if child.is_null() {
                        clone.insert(key.clone(), Value::Null);
                        continue;
                    }

                    // Web application configs key field bundles by layer id.
                    let keyed;
                    let child = if self.templatize_keys && self.pattern.is_match(key) {
                        keyed = self.rewrite(child);
                        &keyed
                    } else {
                        child
                    };

                    match child {
                        Value::Object(_) | Value::Array(_) => {
                            clone.insert(key.clone(), self.by_web_map_layer_id(child)?);
                        }
                        Value::String(text) if embedded_json(text).is_some() => {
                            clone.insert(key.clone(), self.by_web_map_layer_id(child)?);
                        }
                        _ => {
                            matched |= self.leaf_matches(child);
                            clone.insert(key.clone(), child.clone());
                        }
                    }
                }

                Ok(self.finish(clone, matched))
            }
            Value::String(text) => match embedded_json(text) {
                Some(parsed) => {
                    let walked = self.by_web_map_layer_id(&parsed)?;
                    if walked == parsed {
                        Ok(value.clone())
                    } else {
                        Ok(Value::String(serde_json::to_string(&walked)?))
                    }
                }
                None => Ok(value.clone()),
            },
            _ => Ok(value.clone()),
        }
    }
}

/// A string holding a serialized JSON object or array, parsed.
fn embedded_json(text: &str) -> Option<Value> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }

    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|parsed| parsed.is_object() || parsed.is_array())
}
