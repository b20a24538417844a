//! Config file loading and effective-config resolution.
//!
//! A runner invocation's configuration comes from three places, applied in
//! order: the `INTERN_ARGS` environment string, the command-line arguments,
//! and a JSON config file (`intern.json` unless another file is named). A
//! config file may extend another file and may define named child configs
//! under `configs`, selected with `file.json@child`.

mod loader;
mod merge;
mod resolver;
mod text;


// Re-export public API
pub use loader::{CONFIG_PATH_SEPARATOR, ConfigPath, load_config, split_config_path};
pub use merge::apply_option;
pub use resolver::{
    ConfigLoadResult, ConfigRequest, ConfigSource, DEFAULT_CONFIG_FILE, LEADING_ARGV_ENTRIES,
    ProcessInputs, resolve_config,
};
pub use text::{FsTextLoader, TextLoader};
