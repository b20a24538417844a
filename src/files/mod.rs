//! File set expansion.
//!
//! Expands a list of file patterns into a concrete, ordered file list.
//! Patterns may be plain paths or glob patterns; patterns starting with `!`
//! are exclusions. Exclusions only filter glob matches, never plain paths.
//!
//! # Matching Rules
//!
//! - `*`, `?` and `[...]` do not cross `/`; `**` matches any number of
//!   directories
//! - `{a,b}` alternations are supported; `dir/**` also matches `dir`
//! - Outside Windows a backslash escapes the next character (`a\*b` names
//!   the entry `a*b`)
//! - Entries whose names start with `.` are only matched when the pattern
//!   names a dot segment itself
//! - Matches are returned in the form the pattern was written (relative
//!   patterns give relative paths), sorted per pattern

use crate::error::{ResolveError, Result};
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::path::Path;
use walkdir::WalkDir;

#[cfg(test)]
mod tests;

/// Marks an exclusion pattern.
pub const EXCLUDE_PREFIX: char = '!';

/// Expand patterns against the current working directory.
///
/// See [`expand_files_in`].
pub fn expand_files<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<String>> {
    let cwd = std::env::current_dir().map_err(|e| {
        ResolveError::Pattern(format!("failed to get current working directory: {}", e))
    })?;
    expand_files_in(&cwd, patterns)
}

/// Expand patterns against `root`.
///
/// The result is every plain path in input order, followed by the matches of
/// each glob pattern in input order. Plain paths are not checked for
/// existence. Each glob match is dropped if it matches any exclusion.
///
/// # Returns
///
/// * `Ok(files)` - The ordered file list
/// * `Err(ResolveError::Pattern)` - A glob or exclusion failed to compile
pub fn expand_files_in<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<String>> {
    let mut excludes = Vec::new();
    let mut includes = Vec::new();
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if let Some(exclude) = pattern.strip_prefix(EXCLUDE_PREFIX) {
            excludes.push(exclude);
        } else if has_glob_magic(&to_slash(pattern)) {
            includes.push(pattern);
        } else {
            paths.push(pattern.to_string());
        }
    }

    let exclude_set = build_globset(&excludes)?;

    let mut files = paths;
    for pattern in includes {
        files.extend(expand_pattern(root, pattern, &exclude_set)?);
    }
    Ok(files)
}

/// Normalize a config value into a pattern list.
///
/// Absent or `null` gives no patterns, a string gives one, and an array gives
/// its string entries.
pub fn patterns_from_value(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(pattern)) => vec![pattern.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether a pattern contains unescaped glob syntax.
pub fn has_glob_magic(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    let mut open_brace = false;
    let mut brace_has_comma = false;
    let mut open_bracket = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' | '?' => return true,
            '[' => open_bracket = true,
            ']' if open_bracket => return true,
            '{' => {
                open_brace = true;
                brace_has_comma = false;
            }
            ',' if open_brace => brace_has_comma = true,
            '}' if open_brace && brace_has_comma => return true,
            _ => {}
        }
    }

    false
}

fn expand_pattern(root: &Path, pattern: &str, excludes: &GlobSet) -> Result<Vec<String>> {
    let normalized = to_slash(pattern);
    let matcher = compile_glob(&normalized)?;

    let segments: Vec<&str> = normalized.split('/').collect();
    let literal_len = segments
        .iter()
        .take_while(|segment| !has_glob_magic(segment))
        .count();
    let literal: Vec<String> = segments[..literal_len]
        .iter()
        .map(|segment| unescape_glob(segment))
        .collect();
    let prefix = match literal.as_slice() {
        [root] if root.is_empty() => "/".to_string(),
        literal => literal.join("/"),
    };
    let rest = &segments[literal_len..];

    let base = if prefix.is_empty() {
        root.to_path_buf()
    } else {
        root.join(&prefix)
    };
    if !base.is_dir() {
        log::debug!("pattern '{}' has no base directory {}", pattern, base.display());
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(&base).min_depth(1).follow_links(true);
    if !rest.iter().any(|segment| segment.contains("**")) {
        walker = walker.max_depth(rest.len());
    }
    let match_dot = rest.iter().any(|segment| segment.starts_with('.'));

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry while expanding '{}': {}", pattern, err);
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(&base) else {
            continue;
        };
        let relative = to_slash(&relative.to_string_lossy());
        if !match_dot && relative.split('/').any(|part| part.starts_with('.')) {
            continue;
        }

        let candidate = if prefix.is_empty() {
            relative
        } else if prefix.ends_with('/') {
            format!("{}{}", prefix, relative)
        } else {
            format!("{}/{}", prefix, relative)
        };

        if matcher.is_match(&candidate) && !excludes.is_match(&candidate) {
            matches.push(candidate);
        }
    }

    // `dir/**` also matches `dir` itself.
    if matches!(rest, ["**"]) && !prefix.is_empty() && !excludes.is_match(&prefix) {
        matches.push(prefix);
    }

    matches.sort();
    Ok(matches)
}

/// Convert platform separators to `/`.
///
/// Backslashes are separators only on Windows. Elsewhere they escape glob
/// syntax and are left for the glob compiler.
fn to_slash(path: &str) -> String {
    if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

/// Drop glob escapes from a literal segment (`a\*b` names the entry `a*b`).
fn unescape_glob(segment: &str) -> String {
    if cfg!(windows) {
        return segment.to_string();
    }
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ResolveError::Pattern(e.to_string()))
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let normalized = to_slash(pattern.trim());
        if normalized.is_empty() {
            continue;
        }
        let glob = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|e| ResolveError::Pattern(format!("exclusion: {}", e)))?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| ResolveError::Pattern(format!("failed to build exclusion set: {}", e)))
}
