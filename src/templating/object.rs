//! End-to-end field templatization of one object.
//!
//! Two passes run over every object:
//!
//! 1. **Prioritized pass** - for each datasource whose layer url or web map
//!    layer id appears anywhere in the object (catalog order), rewrite the
//!    objects that directly hold that reference
//!    ([`templatize_parent_by_url`], then [`templatize_parent_by_web_map_layer_id`]
//!    once per id).
//! 2. **Ranked pass** - compute the [`replace_order`] of the result and apply
//!    each datasource's fields to the whole object, strongest evidence first.
//!
//! Field names already claimed in pass 1 are placeholders by the time pass 2
//! runs, so pass 2 only picks up what the structural walk missed. Running the
//! templatizer twice produces the same output as running it once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::templatize_field_references;
use super::pattern::{self, PatternMode};
use super::rank::{matches_any_id, replace_order};
use super::walker::{templatize_parent_by_url, templatize_parent_by_web_map_layer_id};
use crate::core::Result;
use crate::datasource::DatasourceInfo;

/// Knobs shared by every templatization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatizeOptions {
    /// How catalog values become match patterns.
    #[serde(default)]
    pub pattern_mode: PatternMode,

    /// Rewrite object keys that equal field names (and let web map layer id
    /// keys select the value beneath them).
    #[serde(default)]
    pub templatize_keys: bool,
}

/// Field templatizer for dashboard and web application objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Templatizer {
    options: TemplatizeOptions,
}

impl Templatizer {
    #[must_use]
    pub const fn new(options: TemplatizeOptions) -> Self {
        Self {
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> TemplatizeOptions {
        self.options
    }

    /// A copy of this templatizer with key templatization switched.
    #[must_use]
    pub const fn with_templatize_keys(self, templatize_keys: bool) -> Self {
        Self {
            options: TemplatizeOptions {
                pattern_mode: self.options.pattern_mode,
                templatize_keys,
            },
        }
    }

    /// Whether `serialized` holds the layer url or a web map layer id of `info`.
    pub fn has_layer_reference(&self, info: &DatasourceInfo, serialized: &str) -> Result<bool> {
        let mode = self.options.pattern_mode;
        if matches_any_id(info, serialized, mode)? {
            return Ok(true);
        }

        Ok(pattern::layer_url_pattern(info, mode)?
            .is_some_and(|layer_url| layer_url.is_match(serialized)))
    }

    /// The prioritized pass on its own.
    pub fn prioritized_tests(&self, obj: &Value, infos: &[DatasourceInfo]) -> Result<Value> {
        let serialized = serde_json::to_string(obj)?;

        let mut referenced = Vec::new();
        for info in infos {
            if self.has_layer_reference(info, &serialized)? {
                referenced.push(info);
            }
        }

        if referenced.is_empty() {
            return Ok(obj.clone());
        }

        let TemplatizeOptions {
            pattern_mode,
            templatize_keys,
        } = self.options;

        let mut result = obj.clone();
        for info in referenced {
            tracing::debug!("Prioritized templatization for datasource {}", info.label());
            result = templatize_parent_by_url(&result, info, templatize_keys, pattern_mode)?;
            for id in &info.ids {
                result = templatize_parent_by_web_map_layer_id(
                    &result,
                    info,
                    id,
                    templatize_keys,
                    pattern_mode,
                )?;
            }
        }

        Ok(result)
    }

    /// Both passes: prioritized parent rewriting, then ranked whole-object rewriting.
    pub fn templatize_object(&self, obj: &Value, infos: &[DatasourceInfo]) -> Result<Value> {
        let mut result = self.prioritized_tests(obj, infos)?;

        let order = replace_order(&result, infos, self.options.pattern_mode)?;
        for info in order {
            result = templatize_field_references(
                &result,
                &info.fields,
                &info.base_path,
                self.options.templatize_keys,
            );
        }

        Ok(result)
    }
}
