//! Path normalization helpers.
//!
//! Paths handled here are plain strings with forward-slash separators, the
//! same shape config files and file patterns use regardless of platform.

/// Normalize a path: resolve `.` and `..` segments, collapse repeated
/// separators, and convert backslashes to forward slashes.
///
/// A trailing separator is preserved. An empty path normalizes to `.`.
/// Windows drive prefixes (`C:`) are kept as the root of the path.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.is_empty() {
        return ".".to_string();
    }

    let (drive, rest) = split_drive(&path);
    let absolute = rest.starts_with('/');
    let trailing = rest.ends_with('/') && rest.len() > 1;

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last().copied() {
                Some(last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let mut normalized = String::from(drive);
    if absolute {
        normalized.push('/');
    }
    normalized.push_str(&parts.join("/"));

    if parts.is_empty() {
        if !absolute && drive.is_empty() {
            normalized.push('.');
        }
        if trailing && !absolute {
            normalized.push('/');
        }
        return normalized;
    }

    if trailing {
        normalized.push('/');
    }
    normalized
}

/// Whether a forward-slash or backslash path is absolute on any platform.
pub fn is_absolute(path: &str) -> bool {
    let path = path.replace('\\', "/");
    let (_, rest) = split_drive(&path);
    rest.starts_with('/')
}

/// Compute the base path for a config file.
///
/// The base path is the directory containing `config_file`. When the config
/// or arguments already carry an explicit `base_path`, an absolute value is
/// used as-is (normalized) and a relative one is resolved against the config
/// file's directory. The result is joined with `separator`.
pub fn get_base_path(config_file: &str, base_path: Option<&str>, separator: &str) -> String {
    let config_file = config_file.replace('\\', "/");
    let parts: Vec<&str> = config_file.split('/').collect();

    let initial = if config_file.starts_with('/') && parts.len() == 2 {
        "/".to_string()
    } else {
        parts[..parts.len().saturating_sub(1)].join("/")
    };

    let resolved = match base_path.filter(|b| !b.is_empty()) {
        Some(base) => {
            let base = normalize_path(base);
            if is_absolute(&base) {
                base
            } else if initial.is_empty() {
                base
            } else {
                normalize_path(&format!("{}/{}", initial, base))
            }
        }
        None => initial,
    };

    resolved.split('/').collect::<Vec<_>>().join(separator)
}

fn split_drive(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        path.split_at(2)
    } else {
        ("", path)
    }
}
