//! CLI argument parsing for intern-config.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// intern-config: resolve what a test runner invocation would use.
///
/// - the effective configuration (INTERN_ARGS, runner args, and intern.json)
/// - the file list a set of suite patterns expands to
/// - the source map attached to a compiled file
#[derive(Parser, Debug)]
#[command(name = "intern-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for intern-config.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the effective configuration.
    ///
    /// Merges INTERN_ARGS, the given runner arguments (`name=value`), and the
    /// config file, then prints `{"config": ..., "file": ...}` as JSON.
    Resolve(ResolveArgs),

    /// Expand file patterns into a file list.
    ///
    /// Plain paths are kept as given; glob patterns are expanded; patterns
    /// starting with `!` exclude glob matches. Prints one path per line.
    Files(FilesArgs),

    /// Print the source map for a compiled file.
    ///
    /// Prints the decoded map as JSON, or nothing if the file has no
    /// source map reference.
    #[command(alias = "sourcemap")]
    SourceMap(SourceMapArgs),

    /// Normalize a path to forward slashes with `.` and `..` resolved.
    Normalize(NormalizeArgs),
}

/// Arguments for the `resolve` command.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Config file to load (`file.json` or `file.json@child`).
    ///
    /// Takes precedence over a `config=` runner argument.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Runner arguments (`name=value` or `name`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `files` command.
#[derive(Parser, Debug)]
pub struct FilesArgs {
    /// Paths, glob patterns, and `!` exclusions.
    #[arg(allow_hyphen_values = true)]
    pub patterns: Vec<String>,

    /// Read patterns from this key of the resolved config instead.
    ///
    /// Uses the default config lookup (INTERN_ARGS and intern.json).
    #[arg(long, conflicts_with = "patterns")]
    pub from_config: Option<String>,
}

/// Arguments for the `source-map` command.
#[derive(Parser, Debug)]
pub struct SourceMapArgs {
    /// Compiled source file.
    pub source_file: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `normalize` command.
#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Path to normalize.
    pub path: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_resolve_minimal() {
        let cli = Cli::try_parse_from(["intern-config", "resolve"]).unwrap();
        if let Command::Resolve(args) = cli.command {
            assert_eq!(args.file, None);
            assert!(args.args.is_empty());
            assert!(!args.pretty);
        } else {
            panic!("Expected Resolve command");
        }
    }

    #[test]
    fn parse_resolve_with_file_and_args() {
        let cli = Cli::try_parse_from([
            "intern-config",
            "resolve",
            "--file",
            "tests/intern.json@ci",
            "suites=tests/unit/*.ts",
            "bail",
        ])
        .unwrap();
        if let Command::Resolve(args) = cli.command {
            assert_eq!(args.file.as_deref(), Some("tests/intern.json@ci"));
            assert_eq!(args.args, vec!["suites=tests/unit/*.ts", "bail"]);
        } else {
            panic!("Expected Resolve command");
        }
    }

    #[test]
    fn parse_files() {
        let cli =
            Cli::try_parse_from(["intern-config", "files", "a.ts", "*.spec.ts", "!skip.spec.ts"])
                .unwrap();
        if let Command::Files(args) = cli.command {
            assert_eq!(args.patterns, vec!["a.ts", "*.spec.ts", "!skip.spec.ts"]);
            assert_eq!(args.from_config, None);
        } else {
            panic!("Expected Files command");
        }
    }

    #[test]
    fn parse_files_from_config() {
        let cli =
            Cli::try_parse_from(["intern-config", "files", "--from-config", "suites"]).unwrap();
        if let Command::Files(args) = cli.command {
            assert_eq!(args.from_config.as_deref(), Some("suites"));
        } else {
            panic!("Expected Files command");
        }
    }

    #[test]
    fn parse_source_map_alias() {
        let cli = Cli::try_parse_from(["intern-config", "sourcemap", "dist/out.js"]).unwrap();
        if let Command::SourceMap(args) = cli.command {
            assert_eq!(args.source_file, PathBuf::from("dist/out.js"));
        } else {
            panic!("Expected SourceMap command");
        }
    }

    #[test]
    fn parse_normalize() {
        let cli = Cli::try_parse_from(["intern-config", "normalize", "a/../b"]).unwrap();
        assert!(matches!(cli.command, Command::Normalize(_)));
    }
}
