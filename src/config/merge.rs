//! Option application and child-config mixing.

use crate::error::{ResolveError, Result};
use serde_json::{Map, Value};

/// Keys merged one level deep when a child config is mixed in.
const ENVIRONMENT_SECTIONS: [&str; 2] = ["node", "browser"];

/// Apply a single option to a config.
///
/// A key ending in `+` is additive: arrays are extended (or a scalar
/// appended), objects are merged shallowly, anything else is replaced. Any
/// other key replaces the existing value.
pub fn apply_option(config: &mut Map<String, Value>, key: &str, value: Value) {
    match key.strip_suffix('+') {
        Some(name) => add_option(config, name, value),
        None => {
            config.insert(key.to_string(), value);
        }
    }
}

fn add_option(config: &mut Map<String, Value>, name: &str, value: Value) {
    let merged = match (config.remove(name), value) {
        (Some(Value::Array(mut items)), Value::Array(more)) => {
            items.extend(more);
            Value::Array(items)
        }
        (Some(Value::Array(mut items)), item) => {
            items.push(item);
            Value::Array(items)
        }
        (Some(Value::Object(mut entries)), Value::Object(more)) => {
            entries.extend(more);
            Value::Object(entries)
        }
        (_, value) => value,
    };
    config.insert(name.to_string(), merged);
}

/// Merge a layer's `configs` entries into the config it extends.
pub(crate) fn merge_child_configs(config: &mut Map<String, Value>, configs: Value) {
    let Value::Object(entries) = configs else {
        config.insert("configs".to_string(), configs);
        return;
    };
    match config.get_mut("configs") {
        Some(Value::Object(existing)) => existing.extend(entries),
        _ => {
            config.insert("configs".to_string(), Value::Object(entries));
        }
    }
}

/// Mix the named child config from `configs` into `config`.
///
/// A child's own `extends` (a child name or list of names) is mixed in
/// first. `node` and `browser` sections merge one level deep.
pub(crate) fn mix_child_config(config: &mut Map<String, Value>, name: &str) -> Result<()> {
    let mut stack = Vec::new();
    mix_child(config, name, &mut stack)
}

fn mix_child(config: &mut Map<String, Value>, name: &str, stack: &mut Vec<String>) -> Result<()> {
    if stack.iter().any(|n| n == name) {
        stack.push(name.to_string());
        return Err(ResolveError::ConfigLoad(format!(
            "circular child config extends: {}",
            stack.join(" -> ")
        )));
    }

    let child = config
        .get("configs")
        .and_then(|configs| configs.get(name))
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| ResolveError::ConfigLoad(format!("Unknown child config \"{}\"", name)))?;

    stack.push(name.to_string());

    if let Some(parents) = child.get("extends") {
        for parent in child_names(name, parents)? {
            mix_child(config, &parent, stack)?;
        }
    }

    for (key, value) in child {
        match key.as_str() {
            "extends" | "description" => {}
            section if ENVIRONMENT_SECTIONS.contains(&section) => {
                merge_environment_section(config, section, value)
            }
            _ => apply_option(config, &key, value),
        }
    }

    stack.pop();
    Ok(())
}

fn child_names(child: &str, parents: &Value) -> Result<Vec<String>> {
    let invalid = || {
        ResolveError::ConfigLoad(format!(
            "child config \"{}\" has an invalid 'extends': expected a name or a list of names",
            child
        ))
    };
    match parents {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Array(names) => names
            .iter()
            .map(|n| n.as_str().map(String::from).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn merge_environment_section(config: &mut Map<String, Value>, section: &str, value: Value) {
    match value {
        Value::Object(entries) if config.get(section).is_some_and(Value::is_object) => {
            if let Some(Value::Object(existing)) = config.get_mut(section) {
                for (key, value) in entries {
                    apply_option(existing, &key, value);
                }
            }
        }
        value => {
            config.insert(section.to_string(), value);
        }
    }
}
