use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Where the raw dictionary document comes from.
pub trait MappingSource: Send + Sync {
    /// Fetch the whole JSON document.
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;

    /// Human-readable origin used in log lines.
    fn describe(&self) -> String;
}

/// Dictionary stored as a file on local disk.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read sign mapping {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Dictionary held in memory, for embedding and tests.
#[derive(Clone, Debug)]
pub struct InlineSource {
    json: String,
}

impl InlineSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl MappingSource for InlineSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.json.clone())
    }

    fn describe(&self) -> String {
        "inline mapping".to_string()
    }
}
