use crate::config::{ProcessInputs, TextLoader};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// In-memory text loader keyed by absolute path.
#[derive(Default)]
pub(crate) struct MemoryLoader {
    files: HashMap<PathBuf, String>,
    failures: HashMap<PathBuf, io::ErrorKind>,
}

impl MemoryLoader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), text.to_string());
        self
    }

    pub(crate) fn with_failure(mut self, path: &str, kind: io::ErrorKind) -> Self {
        self.failures.insert(PathBuf::from(path), kind);
        self
    }
}

#[async_trait]
impl TextLoader for MemoryLoader {
    async fn load_text(&self, path: &Path) -> io::Result<String> {
        if let Some(kind) = self.failures.get(path) {
            return Err(io::Error::new(*kind, "simulated failure"));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

/// Process inputs rooted at `/work` with the given env string and argv.
pub(crate) fn inputs(env_args: Option<&str>, argv: &[&str]) -> ProcessInputs {
    ProcessInputs {
        env_args: env_args.map(String::from),
        argv: argv.iter().map(|s| s.to_string()).collect(),
        cwd: PathBuf::from("/work"),
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
