//! Command implementations for intern-config.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Process-wide state (environment, working directory) is
//! read here and handed to the library as explicit inputs.

use crate::cli::{Command, FilesArgs, NormalizeArgs, ResolveArgs, SourceMapArgs};
use intern_config::config::{
    ConfigLoadResult, ConfigSource, FsTextLoader, ProcessInputs, resolve_config,
};
use intern_config::error::{ResolveError, Result};
use intern_config::files::{expand_files, patterns_from_value};
use intern_config::paths::normalize_path;
use intern_config::source_map::read_source_map;
use serde::Serialize;

/// Dispatch a command to its implementation.
pub async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Resolve(args) => cmd_resolve(args).await,
        Command::Files(args) => cmd_files(args).await,
        Command::SourceMap(args) => cmd_source_map(args),
        Command::Normalize(args) => cmd_normalize(args),
    }
}

async fn cmd_resolve(args: ResolveArgs) -> Result<()> {
    let inputs = ProcessInputs {
        argv: args.args.clone(),
        ..ProcessInputs::from_process()?
    };
    let source = match args.file {
        Some(path) => ConfigSource::ByFile {
            path,
            argv: Some(args.args),
        },
        None => ConfigSource::ByArgv(args.args),
    };

    let result = resolve_config(source, &inputs, &FsTextLoader).await?;
    println!("{}", to_json(&result, args.pretty)?);
    Ok(())
}

async fn cmd_files(args: FilesArgs) -> Result<()> {
    let patterns = match args.from_config {
        Some(key) => {
            let ConfigLoadResult { config, .. } = load_default_config().await?;
            patterns_from_value(config.get(&key))
        }
        None => args.patterns,
    };

    for file in expand_files(&patterns)? {
        println!("{}", file);
    }
    Ok(())
}

fn cmd_source_map(args: SourceMapArgs) -> Result<()> {
    if let Some(map) = read_source_map(&args.source_file, None)? {
        println!("{}", to_json(&map, args.pretty)?);
    } else {
        log::info!("no source map reference in {}", args.source_file.display());
    }
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> Result<()> {
    println!("{}", normalize_path(&args.path));
    Ok(())
}

async fn load_default_config() -> Result<ConfigLoadResult> {
    let inputs = ProcessInputs {
        argv: Vec::new(),
        ..ProcessInputs::from_process()?
    };
    resolve_config(ConfigSource::Default, &inputs, &FsTextLoader).await
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| ResolveError::ConfigLoad(format!("failed to serialize output: {}", e)))
}
