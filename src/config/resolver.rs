//! Effective-config resolution for a runner invocation.

use super::loader::{ConfigPath, load_config, split_config_path};
use super::text::TextLoader;
use crate::args::{ArgsBag, ENV_ARGS_VAR, merge_args, parse_args, parse_env_args};
use crate::error::{ResolveError, Result};
use crate::paths::{get_base_path, normalize_path};
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Config file loaded from the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "intern.json";

/// Leading argv entries that precede user arguments (the program path).
pub const LEADING_ARGV_ENTRIES: usize = 1;

/// Where the resolver should take its config reference and arguments from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// An explicit config file reference (optionally `file@child`). It
    /// overrides any `config` argument. `argv` falls back to the process
    /// arguments when `None`.
    ByFile {
        path: String,
        argv: Option<Vec<String>>,
    },
    /// User arguments only; the config reference, if any, comes from them.
    ByArgv(Vec<String>),
    /// Process arguments only.
    Default,
}

/// Snapshot of the process-wide inputs the resolver reads.
#[derive(Debug, Clone, Default)]
pub struct ProcessInputs {
    /// Raw value of `INTERN_ARGS`, if set.
    pub env_args: Option<String>,
    /// User arguments, without the leading program entry.
    pub argv: Vec<String>,
    /// Directory that relative config paths resolve against.
    pub cwd: PathBuf,
}

impl ProcessInputs {
    /// Capture the environment, process arguments, and working directory.
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            ResolveError::ConfigLoad(format!("failed to get current working directory: {}", e))
        })?;

        Ok(Self {
            env_args: env::var(ENV_ARGS_VAR).ok(),
            argv: env::args().skip(LEADING_ARGV_ENTRIES).collect(),
            cwd,
        })
    }
}

/// Resolved inputs for a config load.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRequest {
    /// Config file named by the `config` reference. A reference that only
    /// selects a child (`@ci`) names [`DEFAULT_CONFIG_FILE`]. `None` when no
    /// reference was given.
    pub config_file: Option<String>,
    /// Child config selected by the reference.
    pub child_config: Option<String>,
    /// Merged environment and command-line arguments, without `config`.
    pub args: ArgsBag,
}

impl ConfigRequest {
    /// Merge environment args, user args, and an explicit file override.
    ///
    /// Later sources win on matching keys: `INTERN_ARGS`, then the argument
    /// vector, then the file named by [`ConfigSource::ByFile`]. The resulting
    /// `config` reference is split on the platform separator.
    pub fn build(source: ConfigSource, inputs: &ProcessInputs) -> Result<Self> {
        let (file, argv) = match source {
            ConfigSource::ByFile { path, argv } => {
                (Some(path), argv.unwrap_or_else(|| inputs.argv.clone()))
            }
            ConfigSource::ByArgv(argv) => (None, argv),
            ConfigSource::Default => (None, inputs.argv.clone()),
        };

        let mut args = match inputs.env_args.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_env_args(raw)?,
            _ => ArgsBag::new(),
        };

        if !argv.is_empty() {
            args = merge_args(args, parse_args(&argv));
        }

        if let Some(file) = file {
            args.insert("config".to_string(), Value::String(file));
        }

        let reference = match args.remove("config") {
            None => None,
            Some(Value::String(config)) if config.is_empty() => None,
            Some(Value::String(config)) => Some(config),
            Some(other) => {
                return Err(ResolveError::InvalidArgs(format!(
                    "config must be a single file reference, got {}",
                    other
                )));
            }
        };

        let Some(reference) = reference else {
            return Ok(Self {
                config_file: None,
                child_config: None,
                args,
            });
        };

        let ConfigPath {
            config_file,
            child_config,
        } = split_config_path(&reference, MAIN_SEPARATOR);
        let config_file = if config_file.is_empty() {
            DEFAULT_CONFIG_FILE.to_string()
        } else {
            config_file
        };

        Ok(Self {
            config_file: Some(config_file),
            child_config,
            args,
        })
    }
}

/// The effective configuration and the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigLoadResult {
    pub config: Map<String, Value>,
    /// Absolute config file path; `None` in zero-config mode.
    pub file: Option<PathBuf>,
}

/// Resolve the effective configuration for a runner invocation.
///
/// When a config reference is given, that file must load. Otherwise
/// `intern.json` in `inputs.cwd` is tried, and if it does not exist the merged
/// arguments alone become the config (zero-config mode).
///
/// When the config came from a file, `basePath` is set relative to the
/// file's directory (or resolved from an explicit `basePath`).
///
/// # Returns
///
/// * `Ok(ConfigLoadResult)` - Merged config and the file it was loaded from
/// * `Err(ResolveError::InvalidArgs)` - Unparseable `INTERN_ARGS` or `config`
/// * `Err(ResolveError::ConfigNotFound)` - An explicitly named file is missing
/// * `Err(ResolveError::ConfigLoad)` - Any other load failure
pub async fn resolve_config(
    source: ConfigSource,
    inputs: &ProcessInputs,
    loader: &dyn TextLoader,
) -> Result<ConfigLoadResult> {
    let request = ConfigRequest::build(source, inputs)?;

    let (mut config, file) = match request.config_file.as_deref() {
        Some(config_file) => {
            let file = resolve_path(&inputs.cwd, config_file);
            let config = load_config(
                &file,
                loader,
                Some(&request.args),
                request.child_config.as_deref(),
            )
            .await?;
            (config, Some(file))
        }
        None => {
            let file = resolve_path(&inputs.cwd, DEFAULT_CONFIG_FILE);
            let loaded = load_config(&file, loader, Some(&request.args), None).await;
            recover_missing_default(loaded, file, &request.args)?
        }
    };

    if let Some(file) = &file {
        let existing = config.get("basePath").and_then(Value::as_str);
        let base_path = get_base_path(&file.to_string_lossy(), existing, "/");
        config.insert("basePath".to_string(), Value::String(base_path));
    }

    Ok(ConfigLoadResult { config, file })
}

/// Fall back to zero-config mode when the default config file is missing.
///
/// Only a missing `default_file` is recovered; a missing file it extends, or
/// any other failure, is returned unchanged.
fn recover_missing_default(
    loaded: Result<Map<String, Value>>,
    default_file: PathBuf,
    args: &ArgsBag,
) -> Result<(Map<String, Value>, Option<PathBuf>)> {
    match loaded {
        Ok(config) => Ok((config, Some(default_file))),
        Err(ResolveError::ConfigNotFound { path }) if path == default_file => {
            log::debug!(
                "no {} found at {}, using arguments only",
                DEFAULT_CONFIG_FILE,
                path.display()
            );
            Ok((args.clone(), None))
        }
        Err(e) => Err(e),
    }
}

fn resolve_path(cwd: &Path, name: &str) -> PathBuf {
    PathBuf::from(normalize_path(&cwd.join(name).to_string_lossy()))
}
