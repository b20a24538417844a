//! Configuration, file-set, and source-map resolution for the intern test
//! runner.
//!
//! - [`config`] merges `INTERN_ARGS`, runner arguments, and a JSON config file
//!   into the effective configuration
//! - [`files`] expands suite patterns (globs with `!` exclusions) into a file
//!   list
//! - [`source_map`] finds and decodes the source map attached to compiled code

pub mod args;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod files;
pub mod paths;
pub mod source_map;

#[cfg(test)]
mod test_support;
