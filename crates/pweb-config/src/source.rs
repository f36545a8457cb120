//! Line-oriented site configuration parser.
//!
//! A document is a sequence of `[section]` headers, each followed by
//! `key = value` assignments. Blank lines and lines starting with `#` or `;`
//! are ignored. Section names are either `global` or a URL path prefix
//! beginning with `/`.
//!
//! Values are typed on the way in: `True`/`False` become booleans, integer
//! literals become integers, quoted text has its quotes stripped, and
//! anything else is kept verbatim as a string.

use indexmap::IndexMap;
use pweb_core::{ConfigError, Scalar};
use std::path::Path;
use tracing::debug;

/// Name of the section every request inherits from.
pub const GLOBAL_SECTION: &str = "global";

/// Key/value pairs of one section, in declaration order.
pub type Settings = IndexMap<String, Scalar>;

/// One parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Where the text came from, used in error messages.
    pub origin: String,
    /// Sections in first-seen order.
    pub sections: IndexMap<String, Settings>,
}

impl Document {
    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse_document(&path.display().to_string(), &text)
    }

    /// Flatten into `(section, key, value)` triples in declaration order.
    pub fn settings(&self) -> impl Iterator<Item = (&str, &str, &Scalar)> {
        self.sections.iter().flat_map(|(section, settings)| {
            settings
                .iter()
                .map(move |(key, value)| (section.as_str(), key.as_str(), value))
        })
    }
}

/// Parse document text. `origin` labels the document in error messages.
pub fn parse_document(origin: &str, text: &str) -> Result<Document, ConfigError> {
    let mut sections: IndexMap<String, Settings> = IndexMap::new();
    let mut current: Option<String> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if is_blank_or_comment(line) {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| ConfigError::parse(origin, line_no, "unterminated section header"))?
                .trim();
            validate_section_name(name)
                .map_err(|message| ConfigError::parse(origin, line_no, message))?;
            if sections.contains_key(name) {
                return Err(ConfigError::parse(
                    origin,
                    line_no,
                    format!("duplicate section [{name}]"),
                ));
            }
            sections.insert(name.to_string(), Settings::new());
            current = Some(name.to_string());
            continue;
        }

        let Some((key, raw_value)) = split_assignment(line)
            .map_err(|message| ConfigError::parse(origin, line_no, message))?
        else {
            return Err(ConfigError::parse(
                origin,
                line_no,
                "expected '[section]' or 'key = value'",
            ));
        };

        let Some(section) = current.as_ref() else {
            return Err(ConfigError::parse(
                origin,
                line_no,
                format!("assignment to '{key}' outside of any section"),
            ));
        };

        let value = parse_value(raw_value);
        // Repeated keys: last declaration wins, first position is kept.
        if let Some(settings) = sections.get_mut(section) {
            settings.insert(key.to_string(), value);
        }
    }

    debug!(origin, sections = sections.len(), "Parsed config document");
    Ok(Document {
        origin: origin.to_string(),
        sections,
    })
}

pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with(';')
}

/// Split `key = value`. `Ok(None)` means the line has no `=` at all.
pub(crate) fn split_assignment(line: &str) -> Result<Option<(&str, &str)>, String> {
    let Some((key, value)) = line.split_once('=') else {
        return Ok(None);
    };
    let key = key.trim();
    if key.is_empty() {
        return Err("missing key before '='".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err(format!("key '{key}' contains whitespace"));
    }
    Ok(Some((key, value.trim())))
}

fn validate_section_name(name: &str) -> Result<(), String> {
    if name == GLOBAL_SECTION {
        return Ok(());
    }
    if !name.starts_with('/') {
        return Err(format!(
            "invalid section name [{name}]: expected 'global' or a path starting with '/'"
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("invalid section name [{name}]: contains whitespace"));
    }
    // `[/images/]` could never cover `/images` or anything below it.
    if name.len() > 1 && name.ends_with('/') {
        return Err(format!(
            "invalid section name [{name}]: trailing '/' (use [{}])",
            name.trim_end_matches('/')
        ));
    }
    Ok(())
}

/// Coerce raw value text into a typed scalar.
///
/// Fails only for text that looks like a typed literal but is malformed:
/// an unterminated quote or an integer outside the `i64` range.
pub fn coerce(raw: &str) -> Result<Scalar, ConfigError> {
    match raw {
        "True" => return Ok(Scalar::Bool(true)),
        "False" => return Ok(Scalar::Bool(false)),
        _ => {}
    }

    if let Some(quote) = raw.chars().next().filter(|c| *c == '"' || *c == '\'') {
        return match raw[1..].strip_suffix(quote) {
            Some(inner) => Ok(Scalar::Str(inner.to_string())),
            None => Err(ConfigError::Type {
                raw: raw.to_string(),
                reason: "unterminated quote".to_string(),
            }),
        };
    }

    if is_integer_literal(raw) {
        return raw.parse::<i64>().map(Scalar::Int).map_err(|_| ConfigError::Type {
            raw: raw.to_string(),
            reason: "integer out of range".to_string(),
        });
    }

    Ok(Scalar::Str(raw.to_string()))
}

/// Coerce a value, falling back to the raw text as a string.
pub fn parse_value(raw: &str) -> Scalar {
    coerce(raw).unwrap_or_else(|err| {
        debug!(error = %err, "Falling back to string value");
        Scalar::Str(raw.to_string())
    })
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
