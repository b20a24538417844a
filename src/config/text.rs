//! Text loading for config files.

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Reads a text resource.
///
/// Config loading suspends only here. An error of kind
/// [`io::ErrorKind::NotFound`] is reported as a missing config file.
#[async_trait]
pub trait TextLoader: Send + Sync {
    async fn load_text(&self, path: &Path) -> io::Result<String>;
}

/// Loads text from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTextLoader;

#[async_trait]
impl TextLoader for FsTextLoader {
    async fn load_text(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}
