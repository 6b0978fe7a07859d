//! Match patterns built from catalog values.
//!
//! Layer urls, web map layer ids and item ids are searched for inside
//! serialized documents. Solution templates have always treated these values as
//! regular expressions without escaping them, and deployed templates depend on
//! that: a `.` in a url matches any character, and a templatized url such as
//! `{{abc.url}}` is matched with its braces read literally. [`PatternMode::Raw`]
//! keeps that behavior; [`PatternMode::Escaped`] quotes every metacharacter.
//!
//! Raw patterns are written in a dialect where a brace that does not form a
//! counted repetition is a literal. The `regex` crate rejects those braces, so
//! [`to_regex_syntax`] escapes them before compiling. Any other construct the
//! `regex` crate cannot compile is reported as
//! [`TemplatizeError::InvalidPattern`].

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::core::{Result, TemplatizeError};
use crate::datasource::DatasourceInfo;

/// How catalog values are turned into patterns.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Use values as regular expressions, the way existing templates expect.
    #[default]
    Raw,
    /// Match values literally.
    Escaped,
}

/// Compile `source` according to `mode`.
pub fn compile(source: &str, mode: PatternMode) -> Result<Regex> {
    let pattern = match mode {
        PatternMode::Raw => to_regex_syntax(source),
        PatternMode::Escaped => regex::escape(source),
    };

    RegexBuilder::new(&pattern).multi_line(true).build().map_err(|e| {
        TemplatizeError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        }
    })
}

/// `url` with its first `.` replaced by `.layer<layer>.`.
#[must_use]
pub fn layer_url_source(url: &str, layer: &str) -> String {
    url.replacen('.', &format!(".layer{layer}."), 1)
}

/// Pattern for the layer-qualified url of `info`.
///
/// `None` unless the record has both a url and a numeric layer id.
pub fn layer_url_pattern(info: &DatasourceInfo, mode: PatternMode) -> Result<Option<Regex>> {
    match (&info.url, info.numeric_layer_id()) {
        (Some(url), Some(layer)) => compile(&layer_url_source(url, &layer), mode).map(Some),
        _ => Ok(None),
    }
}

/// Translate a raw pattern into `regex` crate syntax.
///
/// Braces are kept as counted repetitions only when they follow something
/// repeatable and have the `{n}`, `{n,}` or `{n,m}` shape; every other brace is
/// escaped. Escape sequences and character classes are copied through.
#[must_use]
pub fn to_regex_syntax(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 8);
    let mut in_class = false;
    // Whether the last emitted token can carry a repetition.
    let mut repeatable = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' {
            out.push(c);
            if let Some(&next) = chars.get(i + 1) {
                out.push(next);
            }
            i += 2;
            repeatable = true;
            continue;
        }

        if in_class {
            if c == ']' {
                in_class = false;
                repeatable = true;
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '[' => {
                in_class = true;
                out.push(c);
                // A leading `]` (or `^]`) is a literal member of the class.
                if chars.get(i + 1) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                if chars.get(i + 1) == Some(&']') {
                    out.push(']');
                    i += 1;
                }
            }
            '{' => match counted_repetition_end(&chars, i) {
                Some(end) if repeatable => {
                    out.extend(&chars[i..=end]);
                    i = end;
                    repeatable = false;
                }
                _ => {
                    out.push_str("\\{");
                    repeatable = true;
                }
            },
            '}' => {
                out.push_str("\\}");
                repeatable = true;
            }
            '(' | '|' => {
                out.push(c);
                repeatable = false;
            }
            '*' | '+' | '?' => {
                out.push(c);
                // `x*?` is a lazy repetition, not a repetition of a repetition.
                repeatable = false;
            }
            _ => {
                out.push(c);
                repeatable = true;
            }
        }
        i += 1;
    }

    out
}

/// Index of the closing brace when `chars[start..]` opens `{n}`, `{n,}` or `{n,m}`.
fn counted_repetition_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let digits_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }

    if chars.get(i) == Some(&',') {
        i += 1;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
    }

    (chars.get(i) == Some(&'}')).then_some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_url_source_replaces_first_dot_only() {
        assert_eq!(
            layer_url_source("{{934a.url}}", "2"),
            "{{934a.layer2.url}}"
        );
        assert_eq!(
            layer_url_source("https://services.arcgis.com/rest/FeatureServer", "0"),
            "https://services.layer0.arcgis.com/rest/FeatureServer"
        );
        assert_eq!(layer_url_source("nodots", "1"), "nodots");
    }

    #[test]
    fn test_to_regex_syntax_escapes_literal_braces() {
        assert_eq!(to_regex_syntax("{{abc.url}}"), "\\{\\{abc.url\\}\\}");
        assert_eq!(to_regex_syntax("{x}"), "\\{x\\}");
    }

    #[test]
    fn test_to_regex_syntax_keeps_quantifiers() {
        assert_eq!(to_regex_syntax("a{2}"), "a{2}");
        assert_eq!(to_regex_syntax("[0-9]{1,3}"), "[0-9]{1,3}");
        assert_eq!(to_regex_syntax("(ab){2,}"), "(ab){2,}");
        // nothing to repeat at the start
        assert_eq!(to_regex_syntax("{2}"), "\\{2\\}");
    }

    #[test]
    fn test_to_regex_syntax_copies_escapes_and_classes() {
        assert_eq!(to_regex_syntax("a\\{b"), "a\\{b");
        assert_eq!(to_regex_syntax("[{}]"), "[{}]");
        assert_eq!(to_regex_syntax("[]{]x"), "[]{]x");
    }

    #[test]
    fn test_raw_templatized_url_matches() {
        let re = compile("{{934a.layer2.url}}", PatternMode::Raw).unwrap();
        assert!(re.is_match(r#"{"url":"{{934a.layer2.url}}"}"#));
    }

    #[test]
    fn test_raw_dot_matches_any_character() {
        let raw = compile("a.b", PatternMode::Raw).unwrap();
        let escaped = compile("a.b", PatternMode::Escaped).unwrap();
        assert!(raw.is_match("aXb"));
        assert!(!escaped.is_match("aXb"));
        assert!(escaped.is_match("a.b"));
    }

    #[test]
    fn test_raw_invalid_pattern_is_an_error() {
        let err = compile("layer(", PatternMode::Raw).unwrap_err();
        assert!(matches!(err, TemplatizeError::InvalidPattern { .. }));

        // the same text is fine once escaped
        assert!(compile("layer(", PatternMode::Escaped).is_ok());
    }

    #[test]
    fn test_raw_query_string_url() {
        // `?` makes the preceding character optional in raw mode
        let raw = compile("https://host/FeatureServer?f=json", PatternMode::Raw).unwrap();
        assert!(!raw.is_match("https://host/FeatureServer?f=json"));
        assert!(raw.is_match("https://host/FeatureServef=json"));

        let escaped =
            compile("https://host/FeatureServer?f=json", PatternMode::Escaped).unwrap();
        assert!(escaped.is_match("https://host/FeatureServer?f=json"));
    }

    #[test]
    fn test_layer_url_pattern_requires_url_and_numeric_layer() {
        let info = DatasourceInfo::new("abc.layer0.fields").with_url("{{abc.url}}");
        assert!(layer_url_pattern(&info, PatternMode::Raw).unwrap().is_none());

        let info = info.with_layer_id("zero");
        assert!(layer_url_pattern(&info, PatternMode::Raw).unwrap().is_none());

        let info = DatasourceInfo::new("abc.layer0.fields")
            .with_url("{{abc.url}}")
            .with_layer_id(0);
        let re = layer_url_pattern(&info, PatternMode::Raw).unwrap().unwrap();
        assert!(re.is_match("{{abc.layer0.url}}"));
        assert!(!re.is_match("{{abc.url}}"));
    }
}
