//! Runner argument parsing.
//!
//! Runner options arrive as `name=value` tokens, either on the command line or
//! as a single shell-quoted string in the `INTERN_ARGS` environment variable.
//! Both sources parse into an [`ArgsBag`].

use crate::error::{ResolveError, Result};
use serde_json::{Map, Value};

/// Environment variable holding extra shell-quoted runner arguments.
pub const ENV_ARGS_VAR: &str = "INTERN_ARGS";

/// Option names mapped to values.
pub type ArgsBag = Map<String, Value>;

/// Parse `name=value` tokens into an [`ArgsBag`].
///
/// - `name=value` sets `name` to the string `value`
/// - a bare `name` sets `name` to `true`
/// - `a.b=value` creates nested objects (`{"a": {"b": "value"}}`)
/// - repeating a name with values collects the values into an array
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> ArgsBag {
    let mut parsed = ArgsBag::new();

    for token in tokens {
        let token = token.as_ref();
        let (name, value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };

        let mut path: Vec<&str> = name.split('.').collect();
        let leaf = path.pop().unwrap_or_default();
        let target = descend(&mut parsed, &path);

        match value {
            None => {
                target.insert(leaf.to_string(), Value::Bool(true));
            }
            Some(value) => {
                let value = Value::String(value.to_string());
                match target.get_mut(leaf) {
                    None => {
                        target.insert(leaf.to_string(), value);
                    }
                    Some(Value::Array(values)) => values.push(value),
                    Some(existing) => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                }
            }
        }
    }

    parsed
}

/// Split a shell-quoted argument string and parse the tokens.
pub fn parse_env_args(raw: &str) -> Result<ArgsBag> {
    let tokens = shell_words::split(raw).map_err(|e| {
        ResolveError::InvalidArgs(format!(
            "failed to parse {}: {}\nValue: {}\nFix: check for unmatched quotes or invalid escape sequences.",
            ENV_ARGS_VAR, e, raw
        ))
    })?;
    Ok(parse_args(&tokens))
}

/// Shallow merge: entries in `overlay` replace same-named entries in `base`.
pub fn merge_args(mut base: ArgsBag, overlay: ArgsBag) -> ArgsBag {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}

fn descend<'a>(root: &'a mut ArgsBag, path: &[&str]) -> &'a mut ArgsBag {
    let mut current = root;
    for part in path {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current
}
