//! Rewriting literal field names into placeholders.
//!
//! Given a layer's field catalog and placeholder base path, every reference to
//! one of the fields inside a JSON value is replaced by a placeholder naming the
//! field's schema entry:
//!
//! | Original                | Rewritten                               |
//! |-------------------------|-----------------------------------------|
//! | `"NUMBEDS"`             | `"{{<basePath>.numbeds.name}}"`         |
//! | `"Beds: {NUMBEDS}"`     | `"Beds: {{{<basePath>.numbeds.name}}}"` |
//! | `"$feature.NUMBEDS"`    | `"$feature.{{<basePath>.numbeds.name}}"`|
//! | `"$feature['NUMBEDS']"` | `"$feature['{{<basePath>.numbeds.name}}']"` |
//!
//! A string that is entirely a field name becomes the placeholder. A
//! single-brace token (popup and label text) keeps its own braces around the
//! placeholder, which is where the third brace comes from. Field names match
//! case-insensitively and are lowercased in the placeholder.
//!
//! Placeholders never equal a field name, so rewriting an already rewritten
//! value changes nothing.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::datasource::FieldDescriptor;

const ARCADE_FEATURE: &str = "$feature";

/// `{{<base_path>.<lowercase field>.name}}`
#[must_use]
pub fn field_placeholder(base_path: &str, field_name: &str) -> String {
    format!("{{{{{}}}}}", field_path(base_path, field_name))
}

fn field_path(base_path: &str, field_name: &str) -> String {
    format!("{base_path}.{}.name", field_name.to_lowercase())
}

/// Replace every reference to one of `fields` inside `value`.
///
/// Object keys equal to a field name are rewritten too when `templatize_keys`
/// is set. Returns a new value; `value` is left untouched.
#[must_use]
pub fn templatize_field_references(
    value: &Value,
    fields: &[FieldDescriptor],
    base_path: &str,
    templatize_keys: bool,
) -> Value {
    if fields.is_empty() {
        return value.clone();
    }

    FieldRewriter::new(fields, base_path, templatize_keys).rewrite(value)
}

struct FieldRewriter {
    /// Lowercased field name to placeholder path.
    paths: HashMap<String, String>,
    templatize_keys: bool,
}

impl FieldRewriter {
    fn new(fields: &[FieldDescriptor], base_path: &str, templatize_keys: bool) -> Self {
        let paths = fields
            .iter()
            .map(|field| (field.name.to_lowercase(), field_path(base_path, &field.name)))
            .collect();

        Self {
            paths,
            templatize_keys,
        }
    }

    fn path_for(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.paths.get(&name.to_lowercase()).map(String::as_str)
    }

    fn rewrite(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => match self.rewrite_string(text) {
                Some(rewritten) => Value::String(rewritten),
                None => value.clone(),
            },
            Value::Array(items) => Value::Array(items.iter().map(|item| self.rewrite(item)).collect()),
            Value::Object(map) => {
                let mut rewritten = Map::with_capacity(map.len());
                for (key, child) in map {
                    let key = match self.templatize_keys.then(|| self.path_for(key)).flatten() {
                        Some(path) => format!("{{{{{path}}}}}"),
                        None => key.clone(),
                    };
                    rewritten.insert(key, self.rewrite(child));
                }
                Value::Object(rewritten)
            }
            _ => value.clone(),
        }
    }

    fn rewrite_string(&self, text: &str) -> Option<String> {
        if let Some(path) = self.path_for(text) {
            return Some(format!("{{{{{path}}}}}"));
        }

        let braced = self.rewrite_brace_tokens(text);
        let current = braced.as_deref().unwrap_or(text);
        match self.rewrite_arcade(current) {
            Some(rewritten) => Some(rewritten),
            None => braced,
        }
    }

    /// `{FIELD}` tokens that are not part of a longer brace run.
    fn rewrite_brace_tokens(&self, text: &str) -> Option<String> {
        if !text.contains('{') {
            return None;
        }

        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len() + 32);
        let mut cursor = 0;
        let mut search = 0;
        let mut changed = false;

        while let Some(offset) = text[search..].find('{') {
            let open = search + offset;
            let Some(close_offset) = text[open + 1..].find(['{', '}']) else {
                break;
            };
            let close = open + 1 + close_offset;
            if bytes[close] == b'{' {
                search = close;
                continue;
            }

            let preceded = open > 0 && bytes[open - 1] == b'{';
            let followed = bytes.get(close + 1) == Some(&b'}');
            if !preceded
                && !followed
                && let Some(path) = self.path_for(&text[open + 1..close])
            {
                out.push_str(&text[cursor..open]);
                out.push('{');
                out.push_str(&format!("{{{{{path}}}}}"));
                out.push('}');
                cursor = close + 1;
                changed = true;
            }
            search = close + 1;
        }

        if !changed {
            return None;
        }
        out.push_str(&text[cursor..]);
        Some(out)
    }

    /// Arcade `$feature.FIELD` and `$feature["FIELD"]` references.
    fn rewrite_arcade(&self, text: &str) -> Option<String> {
        if !text.contains(ARCADE_FEATURE) {
            return None;
        }

        let mut out = String::with_capacity(text.len() + 32);
        let mut cursor = 0;
        let mut search = 0;
        let mut changed = false;

        while let Some(offset) = text[search..].find(ARCADE_FEATURE) {
            let after = search + offset + ARCADE_FEATURE.len();
            search = after;
            let tail = &text[after..];

            if let Some(member) = tail.strip_prefix('.') {
                let len = member
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(member.len());
                let name = &member[..len];
                if name.starts_with(|c: char| c.is_ascii_digit()) {
                    continue;
                }
                if let Some(path) = self.path_for(name) {
                    out.push_str(&text[cursor..after]);
                    out.push('.');
                    out.push_str(&format!("{{{{{path}}}}}"));
                    cursor = after + 1 + len;
                    search = cursor;
                    changed = true;
                }
            } else if let Some((quote, name, consumed)) = parse_bracket_access(tail)
                && let Some(path) = self.path_for(name)
            {
                out.push_str(&text[cursor..after]);
                out.push_str(&format!("[{quote}{{{{{path}}}}}{quote}]"));
                cursor = after + consumed;
                search = cursor;
                changed = true;
            }
        }

        if !changed {
            return None;
        }
        out.push_str(&text[cursor..]);
        Some(out)
    }
}

/// Parse `["NAME"]` / `['NAME']` (inner whitespace allowed) at the start of `tail`.
///
/// Returns the quote character, the name and the number of bytes consumed.
fn parse_bracket_access(tail: &str) -> Option<(char, &str, usize)> {
    let inner = tail.strip_prefix('[')?;
    let trimmed = inner.trim_start();
    let quote = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'')?;

    let name_start = tail.len() - trimmed.len() + 1;
    let name_len = tail[name_start..].find(quote)?;
    let name = &tail[name_start..name_start + name_len];

    let after_quote = name_start + name_len + 1;
    let rest = tail[after_quote..].trim_start();
    rest.strip_prefix(']')?;

    let consumed = tail.len() - rest.len() + 1;
    Some((quote, name, consumed))
}
