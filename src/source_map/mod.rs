//! Source map lookup for compiled source files.
//!
//! A source map reference must be on the last line of a file, as either
//! `//# sourceMappingURL=<token>` (or the legacy `//@` form) or
//! `/* sourceMappingURL=<token> */`. The token is either an inline
//! `data:<mime>;base64,<payload>` URI or a map file path relative to the
//! source file.
//!
//! Reads here are blocking. Lookups happen while reporting errors or
//! coverage, not on a hot path.

use crate::error::{ResolveError, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;


static SOURCE_MAP_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/{2}[#@]{1,2}|/\*)\s+sourceMappingURL\s*=\s*(data:(?:[^;]+;)+base64,)?(\S+)")
        .expect("Invalid source map comment regex")
});

/// Standard base64 that accepts payloads with or without padding.
const INLINE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where a source file's map lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMapRef {
    /// Base64 payload of an inline `data:` URI.
    Inline(String),
    /// Map file path as written in the comment.
    External(String),
}

/// A decoded source map.
///
/// The parsed JSON is kept as written, so serializing it gives back the
/// original map. Field accessors do not require the revision 3 fields to be
/// present or well-typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSourceMap(Value);

impl RawSourceMap {
    /// Look up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The `mappings` string, if present.
    pub fn mappings(&self) -> Option<&str> {
        self.get("mappings").and_then(Value::as_str)
    }

    /// Entries of `sources`. Non-string entries come back as `None`.
    pub fn sources(&self) -> Vec<Option<&str>> {
        match self.get("sources") {
            Some(Value::Array(sources)) => sources.iter().map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Return the last content line of `code`.
///
/// A single trailing newline is not treated as starting an empty last line.
pub fn last_line(code: &str) -> &str {
    let end = code.char_indices().next_back().map_or(0, |(idx, _)| idx);
    match code[..end].rfind('\n') {
        Some(newline) => &code[newline + 1..],
        None => code,
    }
}

/// Find a source map reference on the last line of `code`.
pub fn find_source_map_ref(code: &str) -> Option<SourceMapRef> {
    let captures = SOURCE_MAP_COMMENT.captures(last_line(code))?;
    let token = captures.get(2)?.as_str().to_string();

    if captures.get(1).is_some() {
        Some(SourceMapRef::Inline(token))
    } else {
        Some(SourceMapRef::External(token))
    }
}

/// Read the source map for `source_file`, if it has one.
///
/// `code` is the file's contents; when absent or empty the file is read.
///
/// # Returns
///
/// * `Ok(Some(map))` - The decoded inline or external source map
/// * `Ok(None)` - The last line has no source map reference
/// * `Err(ResolveError::SourceMap)` - The source or map file is unreadable,
///   or the payload is not valid base64, UTF-8, or JSON
pub fn read_source_map(source_file: &Path, code: Option<&str>) -> Result<Option<RawSourceMap>> {
    let loaded;
    let code = match code.filter(|code| !code.is_empty()) {
        Some(code) => code,
        None => {
            loaded = read_text(source_file)?;
            loaded.as_str()
        }
    };

    match find_source_map_ref(code) {
        None => Ok(None),
        Some(SourceMapRef::Inline(payload)) => decode_inline(&payload).map(Some),
        Some(SourceMapRef::External(map_file)) => {
            let map_path = map_path_for(source_file, &map_file);
            log::debug!(
                "reading source map {} for {}",
                map_path.display(),
                source_file.display()
            );
            parse_source_map(&read_text(&map_path)?, &map_path.display().to_string()).map(Some)
        }
    }
}

/// Decode an inline base64 source map payload.
pub fn decode_inline(payload: &str) -> Result<RawSourceMap> {
    let bytes = INLINE_BASE64
        .decode(payload)
        .map_err(|e| ResolveError::SourceMap(format!("invalid base64 payload: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| ResolveError::SourceMap(format!("inline source map is not UTF-8: {}", e)))?;
    parse_source_map(&text, "inline source map")
}

/// Resolve a map file reference against the source file's directory.
fn map_path_for(source_file: &Path, map_file: &str) -> PathBuf {
    source_file
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(map_file)
}

fn parse_source_map(text: &str, origin: &str) -> Result<RawSourceMap> {
    serde_json::from_str(text)
        .map_err(|e| ResolveError::SourceMap(format!("failed to parse {}: {}", origin, e)))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ResolveError::SourceMap(format!("failed to read '{}': {}", path.display(), e))
    })
}
