//! Exit code constants for the intern-config CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unbalanced quoting)
//! - 2: Config failure (missing explicit config, malformed file, unknown child)
//! - 3: Pattern failure (malformed glob)
//! - 4: Source map failure (bad base64, bad JSON, unreadable map file)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an unparseable argument string.
pub const USER_ERROR: i32 = 1;

/// Config failure: the requested config could not be loaded.
pub const CONFIG_FAILURE: i32 = 2;

/// Pattern failure: a file pattern could not be compiled.
pub const PATTERN_FAILURE: i32 = 3;

/// Source map failure: a referenced source map could not be decoded.
pub const SOURCE_MAP_FAILURE: i32 = 4;
