use std::future::Future;

use dashmap::DashMap;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("asset path is empty")]
    EmptyPath,
    #[error("asset not found: {0}")]
    NotFound(String),
}

/// Turns a dictionary asset path into a URL a player can fetch.
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, path: &str) -> impl Future<Output = Result<String, ResolveError>> + Send;
}

/// Serves assets under a fixed URL prefix; absolute URLs pass through.
#[derive(Clone, Debug)]
pub struct PrefixResolver {
    base: String,
}

impl PrefixResolver {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Default for PrefixResolver {
    fn default() -> Self {
        Self::new("/")
    }
}

impl AssetResolver for PrefixResolver {
    async fn resolve(&self, path: &str) -> Result<String, ResolveError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(ResolveError::EmptyPath);
        }
        if is_absolute_url(path) {
            return Ok(path.to_string());
        }
        Ok(format!("{}{}", self.base, path.trim_start_matches('/')))
    }
}

/// Adapts a plain function into an [`AssetResolver`].
#[derive(Clone, Debug)]
pub struct FnResolver<F>(pub F);

impl<F> AssetResolver for FnResolver<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    async fn resolve(&self, path: &str) -> Result<String, ResolveError> {
        Ok((self.0)(path))
    }
}

/// Memoizes another resolver's successful results.
pub struct CachingResolver<R> {
    inner: R,
    memo: DashMap<String, String>,
}

impl<R: AssetResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            memo: DashMap::new(),
        }
    }

    pub fn cached(&self, path: &str) -> Option<String> {
        self.memo.get(path).map(|url| url.value().clone())
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Resolve every path ahead of playback; returns how many resolved.
    pub async fn preload<I, S>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = 0;
        for path in paths {
            match self.resolve(path.as_ref()).await {
                Ok(_) => resolved += 1,
                Err(err) => warn!("preload failed for {:?}: {err}", path.as_ref()),
            }
        }
        resolved
    }
}

impl<R: AssetResolver> AssetResolver for CachingResolver<R> {
    async fn resolve(&self, path: &str) -> Result<String, ResolveError> {
        if let Some(hit) = self.cached(path) {
            return Ok(hit);
        }
        let url = self.inner.resolve(path).await?;
        self.memo.insert(path.to_string(), url.clone());
        Ok(url)
    }
}

pub(crate) fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
