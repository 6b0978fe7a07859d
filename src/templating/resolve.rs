//! Resolving placeholders against a settings dictionary.
//!
//! The inverse of field templatization: `{{path}}` becomes the value found at
//! the dotted `path` inside the settings, and `{{{path}}}` becomes that value
//! wrapped in single braces, restoring the brace token it was made from.
//! Settings produced by [`crate::datasource::field_settings`] give back the
//! catalog's own field names; a deployment dictionary maps them to the fields
//! of the target organization.

use serde_json::{Map, Value};
use strsim::levenshtein;

use crate::core::{Result, TemplatizeError};

/// Maximum edit distance for "did you mean" suggestions, as a percentage of
/// the unresolved path's length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Resolve every placeholder in `value` (keys included).
///
/// A string that consists of exactly one `{{path}}` placeholder is replaced by
/// the resolved JSON value itself, so numbers and objects keep their type.
/// Unresolved placeholders are an error when `strict`, otherwise they are left
/// in place and logged.
pub fn resolve_placeholders(value: &Value, settings: &Value, strict: bool) -> Result<Value> {
    Resolver {
        settings,
        strict,
    }
    .resolve(value)
}

struct Resolver<'a> {
    settings: &'a Value,
    strict: bool,
}

/// One placeholder occurrence inside a string.
struct Placeholder<'t> {
    start: usize,
    end: usize,
    path: &'t str,
    triple: bool,
}

impl Resolver<'_> {
    fn resolve(&self, value: &Value) -> Result<Value> {
        match value {
            Value::String(text) => self.resolve_string(text),
            Value::Array(items) => {
                items.iter().map(|item| self.resolve(item)).collect::<Result<Vec<_>>>().map(Value::Array)
            }
            Value::Object(map) => {
                let mut resolved = Map::with_capacity(map.len());
                for (key, child) in map {
                    resolved.insert(self.resolve_text(key)?, self.resolve(child)?);
                }
                Ok(Value::Object(resolved))
            }
            _ => Ok(value.clone()),
        }
    }

    fn resolve_string(&self, text: &str) -> Result<Value> {
        let placeholders = find_placeholders(text);
        if let [only] = placeholders.as_slice()
            && !only.triple
            && only.start == 0
            && only.end == text.len()
            && let Some(found) = self.lookup(only.path)
            && !found.is_string()
        {
            return Ok(found.clone());
        }

        self.resolve_text(text).map(Value::String)
    }

    fn resolve_text(&self, text: &str) -> Result<String> {
        let placeholders = find_placeholders(text);
        if placeholders.is_empty() {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for placeholder in placeholders {
            out.push_str(&text[cursor..placeholder.start]);
            cursor = placeholder.end;

            match self.lookup(placeholder.path) {
                Some(found) => {
                    let rendered = render(found)?;
                    if placeholder.triple {
                        out.push('{');
                        out.push_str(&rendered);
                        out.push('}');
                    } else {
                        out.push_str(&rendered);
                    }
                }
                None if self.strict => {
                    return Err(TemplatizeError::UnresolvedPlaceholder {
                        path: placeholder.path.to_string(),
                        suggestions: self.similar_paths(placeholder.path),
                    });
                }
                None => {
                    tracing::warn!("No value for placeholder '{}', leaving it in place", placeholder.path);
                    out.push_str(&text[placeholder.start..placeholder.end]);
                }
            }
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self.settings, |current, segment| current.as_object()?.get(segment))
    }

    fn similar_paths(&self, target: &str) -> Vec<String> {
        let mut available = Vec::new();
        collect_paths(self.settings, String::new(), &mut available);

        let mut scored: Vec<_> =
            available.into_iter().map(|path| (levenshtein(target, &path), path)).collect();
        scored.sort();

        scored
            .into_iter()
            .filter(|(distance, _)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(_, path)| path)
            .collect()
    }
}

fn render(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)?,
    })
}

fn collect_paths(value: &Value, prefix: String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_paths(child, path, out);
            }
        }
        _ if !prefix.is_empty() => out.push(prefix),
        _ => {}
    }
}

fn is_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate.contains(|c: char| c == '{' || c == '}' || c.is_whitespace())
}

/// Placeholders in `text`, left to right, non-overlapping.
fn find_placeholders(text: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut search = 0;

    while let Some(offset) = text[search..].find("{{") {
        let start = search + offset;
        let triple = text[start..].starts_with("{{{");
        let (open_len, close) = if triple {
            (3, "}}}")
        } else {
            (2, "}}")
        };

        let inner_start = start + open_len;
        match text[inner_start..].find(close) {
            Some(len) if is_path(&text[inner_start..inner_start + len]) => {
                let end = inner_start + len + close.len();
                found.push(Placeholder {
                    start,
                    end,
                    path: &text[inner_start..inner_start + len],
                    triple,
                });
                search = end;
            }
            _ => search = start + 1,
        }
    }

    found
}
