//! JSON config file loading.

use super::merge::{apply_option, merge_child_configs, mix_child_config};
use super::text::TextLoader;
use crate::args::ArgsBag;
use crate::error::{ResolveError, Result};
use crate::paths::normalize_path;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Separates a config file path from a child config name (`intern.json@ci`).
pub const CONFIG_PATH_SEPARATOR: char = '@';

/// A config reference split into its file and optional child config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    /// Config file path; empty when only a child config was named.
    pub config_file: String,
    pub child_config: Option<String>,
}

/// Split a config reference into a file path and a child config name.
///
/// - `@ci` names a child of the default config file
/// - `intern.json` and `configs/@ci` (marker directly after a `separator`) are
///   plain file paths
/// - `intern.json@ci` names the child `ci` of `intern.json`
pub fn split_config_path(path: &str, separator: char) -> ConfigPath {
    match path.rfind(CONFIG_PATH_SEPARATOR) {
        Some(0) => ConfigPath {
            config_file: String::new(),
            child_config: Some(path[1..].to_string()),
        },
        Some(idx) if !path[..idx].ends_with(separator) => ConfigPath {
            config_file: path[..idx].to_string(),
            child_config: Some(path[idx + 1..].to_string()),
        },
        _ => ConfigPath {
            config_file: path.to_string(),
            child_config: None,
        },
    }
}

/// A parsed config file and the child config requested when it was loaded.
struct Layer {
    raw: Map<String, Value>,
    child: Option<String>,
}

/// Load a config file, its `extends` chain, an optional child config, and
/// apply `args` over the result.
///
/// Child config mixing is skipped when `args` asks for `showConfigs` or
/// `help`, so the file's `configs` can be listed as written.
///
/// # Returns
///
/// * `Ok(config)` - The merged config object
/// * `Err(ResolveError::ConfigNotFound)` - A file in the chain does not exist
/// * `Err(ResolveError::ConfigLoad)` - Unreadable or malformed file, unknown
///   child config, or circular `extends`
pub async fn load_config(
    path: &Path,
    loader: &dyn TextLoader,
    args: Option<&ArgsBag>,
    child_config: Option<&str>,
) -> Result<Map<String, Value>> {
    let listing_configs =
        args.is_some_and(|args| args.contains_key("showConfigs") || args.contains_key("help"));
    let child_config = child_config.filter(|_| !listing_configs);

    let layers = load_chain(path, loader, child_config).await?;

    let mut config: Option<Map<String, Value>> = None;
    for layer in layers.into_iter().rev() {
        let mut built = match config.take() {
            None => {
                let mut fresh = Map::new();
                for (key, value) in layer.raw {
                    if key != "extends" {
                        apply_option(&mut fresh, &key, value);
                    }
                }
                fresh
            }
            Some(mut base) => {
                for (key, value) in layer.raw {
                    match key.as_str() {
                        "extends" => {}
                        "configs" => merge_child_configs(&mut base, value),
                        _ => apply_option(&mut base, &key, value),
                    }
                }
                base
            }
        };

        if let Some(child) = &layer.child {
            mix_child_config(&mut built, child)?;
        }
        config = Some(built);
    }

    let mut config = config.unwrap_or_default();
    if let Some(args) = args {
        for (key, value) in args {
            apply_option(&mut config, key, value.clone());
        }
    }
    Ok(config)
}

/// Read `path` and every file it extends, nearest first.
async fn load_chain(
    path: &Path,
    loader: &dyn TextLoader,
    child_config: Option<&str>,
) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();
    let mut seen = HashSet::new();
    let mut current = path.to_path_buf();
    let mut child = child_config.map(String::from);

    loop {
        if !seen.insert(current.clone()) {
            return Err(ResolveError::ConfigLoad(format!(
                "circular extends chain at '{}'",
                current.display()
            )));
        }

        log::debug!("loading config file {}", current.display());
        let text = read_config_text(&current, loader).await?;
        let raw = parse_config_text(&text, &current)?;

        let extends = match raw.get("extends") {
            None => None,
            Some(Value::String(extends)) => Some(extends.clone()),
            Some(_) => {
                return Err(ResolveError::ConfigLoad(format!(
                    "'extends' in '{}' must be a string",
                    current.display()
                )));
            }
        };

        layers.push(Layer {
            raw,
            child: child.take(),
        });

        let Some(extends) = extends else {
            break;
        };

        let ConfigPath {
            config_file,
            child_config,
        } = split_config_path(&extends, '/');
        if config_file.is_empty() {
            return Err(ResolveError::ConfigLoad(format!(
                "'extends' in '{}' must name a config file",
                current.display()
            )));
        }
        current = sibling_path(&current, &config_file);
        child = child_config;
    }

    Ok(layers)
}

async fn read_config_text(path: &Path, loader: &dyn TextLoader) -> Result<String> {
    loader.load_text(path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ResolveError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ResolveError::ConfigLoad(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })
}

/// Parse config JSON. Line and block comments are allowed.
fn parse_config_text(text: &str, path: &Path) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(&strip_json_comments(text)).map_err(|e| {
        ResolveError::ConfigLoad(format!(
            "failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ResolveError::ConfigLoad(format!(
            "config file '{}' must contain a JSON object",
            path.display()
        ))),
    }
}

/// Resolve `relative` against the directory containing `file`.
fn sibling_path(file: &Path, relative: &str) -> PathBuf {
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    PathBuf::from(normalize_path(&dir.join(relative).to_string_lossy()))
}

/// Remove `//` and `/* */` comments that appear outside string literals.
pub(crate) fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}
