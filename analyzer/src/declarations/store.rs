//! Shared declaration index with a coalesced, load-once ingestion step.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};

use super::{DeclarationIndex, error_location, parse_declarations};

/// One raw declaration source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationFile {
    pub filename: String,
    pub content: String,
}

/// The loader could not produce any declaration sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("declaration loader failed: {0}")]
    Loader(String),
}

/// Fetches declaration sources. Manifest lookup, caching and remote fallback are the
/// loader's business; the store only parses what it returns.
pub trait DeclarationLoader: Send + Sync {
    fn load_declaration_texts(
        &self,
        candidate_base_urls: &[String],
    ) -> BoxFuture<'static, Result<Vec<DeclarationFile>, LoadError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub filename: String,
    pub error: String,
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub parsed: Vec<String>,
    pub failed: Vec<FailedFile>,
    pub load_error: Option<String>,
}

type PendingLoad = Shared<BoxFuture<'static, LoadReport>>;

#[derive(Default)]
struct StoreInner {
    index: RwLock<DeclarationIndex>,
    load: Mutex<Option<PendingLoad>>,
}

/// Cheaply cloneable handle to the process-wide [`DeclarationIndex`].
///
/// The index only grows: files are merged with first-wins semantics, and a file that
/// fails to parse contributes nothing.
#[derive(Clone, Default)]
pub struct DeclarationStore {
    inner: Arc<StoreInner>,
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the current index.
    pub fn read(&self) -> RwLockReadGuard<'_, DeclarationIndex> {
        // The index is append-only, so a poisoned guard still holds a valid index.
        self.inner
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Parses and merges `files` synchronously, one file at a time.
    pub fn ingest(&self, files: &[DeclarationFile]) -> LoadReport {
        let mut report = LoadReport::default();
        for file in files {
            match parse_declarations(&file.content) {
                Ok(parsed) => {
                    self.inner
                        .index
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .merge(parsed);
                    report.parsed.push(file.filename.clone());
                }
                Err(err) => {
                    tracing::warn!(
                        file = %file.filename,
                        at = %error_location(&file.content, &err),
                        error = %err,
                        "skipping malformed declaration file"
                    );
                    report.failed.push(FailedFile {
                        filename: file.filename.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        tracing::debug!(
            parsed = report.parsed.len(),
            failed = report.failed.len(),
            "declaration files ingested"
        );
        report
    }

    /// Starts (or joins) the single declaration load.
    ///
    /// Concurrent callers share one in-flight future, and once it succeeds every later
    /// caller gets the same finished result without touching the loader again. A loader
    /// failure clears the slot so the next trigger retries.
    pub fn ensure_loaded(
        &self,
        loader: &dyn DeclarationLoader,
        candidate_base_urls: &[String],
    ) -> PendingLoad {
        let mut slot = self
            .inner
            .load
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = slot.as_ref() {
            return pending.clone();
        }

        let fetch = loader.load_declaration_texts(candidate_base_urls);
        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
        let pending = async move {
            let result = fetch.await;
            let Some(inner) = weak.upgrade() else {
                return LoadReport::default();
            };
            let store = DeclarationStore { inner };
            match result {
                Ok(files) => store.ingest(&files),
                Err(err) => {
                    tracing::warn!(error = %err, "declaration load failed");
                    store
                        .inner
                        .load
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .take();
                    LoadReport {
                        load_error: Some(err.to_string()),
                        ..LoadReport::default()
                    }
                }
            }
        }
        .boxed()
        .shared();

        *slot = Some(pending.clone());
        pending
    }
}
