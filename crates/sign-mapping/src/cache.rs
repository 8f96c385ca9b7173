use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::SignMapping;
use crate::source::MappingSource;

/// Lifecycle of a [`MappingCache`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheState {
    Uninitialized,
    Loading,
    Loaded,
    Failed,
}

impl CacheState {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheState::Uninitialized => "uninitialized",
            CacheState::Loading => "loading",
            CacheState::Loaded => "loaded",
            CacheState::Failed => "failed",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => CacheState::Loading,
            2 => CacheState::Loaded,
            3 => CacheState::Failed,
            _ => CacheState::Uninitialized,
        }
    }
}

/// Single-flight, load-once holder for a [`SignMapping`].
///
/// Concurrent callers share one fetch. A failed fetch hands every caller that
/// waited on it an empty mapping; the next call after that retries. Once a
/// load succeeds the mapping is never fetched again.
pub struct MappingCache<S> {
    source: S,
    loaded: OnceLock<Arc<SignMapping>>,
    gate: Mutex<()>,
    state: AtomicU8,
    failures: AtomicU64,
}

impl<S: MappingSource> MappingCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            loaded: OnceLock::new(),
            gate: Mutex::new(()),
            state: AtomicU8::new(CacheState::Uninitialized as u8),
            failures: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> CacheState {
        CacheState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The mapping if a load has already succeeded.
    pub fn get(&self) -> Option<Arc<SignMapping>> {
        self.loaded.get().cloned()
    }

    /// Return the cached mapping, loading it first if needed. Never fails:
    /// load errors are logged and yield an empty mapping.
    pub async fn load(&self) -> Arc<SignMapping> {
        if let Some(mapping) = self.loaded.get() {
            return Arc::clone(mapping);
        }

        let failures_seen = self.failures.load(Ordering::Acquire);
        let _guard = self.gate.lock().await;

        if let Some(mapping) = self.loaded.get() {
            return Arc::clone(mapping);
        }
        if self.failures.load(Ordering::Acquire) != failures_seen {
            debug!("sign mapping load failed while waiting; using empty mapping");
            return Arc::new(SignMapping::empty());
        }

        self.set_state(CacheState::Loading);
        let start = Instant::now();
        match self.fetch_and_parse().await {
            Ok(mapping) => {
                let report = mapping.report();
                info!(
                    "sign mapping loaded from {} in {} ms: {} entries ({} rejected, {} overwritten)",
                    self.source.describe(),
                    start.elapsed().as_millis(),
                    report.accepted,
                    report.rejected,
                    report.overwritten
                );
                let mapping = Arc::new(mapping);
                let _ = self.loaded.set(Arc::clone(&mapping));
                self.set_state(CacheState::Loaded);
                mapping
            }
            Err(err) => {
                error!(
                    "failed to load sign mapping from {}: {err:#}",
                    self.source.describe()
                );
                self.failures.fetch_add(1, Ordering::AcqRel);
                self.set_state(CacheState::Failed);
                Arc::new(SignMapping::empty())
            }
        }
    }

    async fn fetch_and_parse(&self) -> Result<SignMapping> {
        let raw = self.source.fetch().await?;
        SignMapping::from_json_str(&raw)
    }

    fn set_state(&self, state: CacheState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use anyhow::bail;

    use super::*;

    struct CountingSource {
        fetches: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MappingSource for CountingSource {
        async fn fetch(&self) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                bail!("source offline");
            }
            Ok(r#"{ "مرحبا": { "path": "v/hi.mp4" } }"#.to_string())
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn cache(fail: bool) -> (MappingCache<CountingSource>, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            fetches: Arc::clone(&fetches),
            fail,
        };
        (MappingCache::new(source), fetches)
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_fetch() {
        let (cache, fetches) = cache(false);
        assert_eq!(cache.state(), CacheState::Uninitialized);
        assert!(cache.get().is_none());

        let (a, b, c) = tokio::join!(cache.load(), cache.load(), cache.load());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
        assert_eq!(a.len(), 1);
        assert_eq!(cache.state(), CacheState::Loaded);

        cache.load().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(cache.get().is_some());
    }

    #[tokio::test]
    async fn failure_degrades_to_empty_and_retries_later() {
        let (cache, fetches) = cache(true);

        let (a, b) = tokio::join!(cache.load(), cache.load());
        assert!(a.is_empty());
        assert!(b.is_empty());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(), CacheState::Failed);

        let again = cache.load().await;
        assert!(again.is_empty());
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert!(cache.get().is_none());
    }

    #[tokio::test]
    async fn malformed_document_counts_as_failure() {
        let cache = MappingCache::new(crate::InlineSource::new("not json"));
        assert!(cache.load().await.is_empty());
        assert_eq!(cache.state(), CacheState::Failed);
        assert_eq!(CacheState::Failed.as_str(), "failed");
    }
}
