//! Background enrichment from the language-service worker.
//!
//! Every query is tagged with a fresh [`RequestId`]. Only the response matching the
//! latest issued id may touch popup state; anything older is dropped on arrival.

use std::fmt;

use analyzer::ExpressionContext;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::completion::{
    CompletionKind, CompletionSource, SuggestionItem, SuggestionSource, sort_and_dedup,
};

/// One entry of the worker's completion list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCompletion {
    pub name: String,
    #[serde(default)]
    pub insert_text: Option<String>,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("language service failed: {0}")]
    Failed(String),
    #[error("language service disconnected")]
    Disconnected,
}

/// The language-service worker, consumed only through its completion query.
///
/// Futures are polled on the UI thread, so they need not be `Send`.
pub trait LanguageService {
    fn completions(
        &self,
        buffer_uri: &str,
        offset: u32,
    ) -> LocalBoxFuture<'static, Result<Vec<WorkerCompletion>, WorkerError>>;
}

/// Strictly increasing within one popup session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Issues request ids and remembers which one is current.
#[derive(Debug, Default)]
pub struct EnrichmentCoordinator {
    next: u64,
    latest: Option<RequestId>,
}

impl EnrichmentCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new id and makes it the only current one.
    pub fn issue(&mut self) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        self.latest = Some(id);
        id
    }

    /// Fires one worker query. The previous query, if any, keeps running but its
    /// response will no longer be current.
    pub fn query(
        &mut self,
        service: &dyn LanguageService,
        source: CompletionSource,
    ) -> PendingEnrichment {
        let request_id = self.issue();
        tracing::trace!(
            request = request_id.get(),
            uri = %source.buffer_uri,
            offset = source.offset,
            "issuing worker query"
        );
        let future = service.completions(&source.buffer_uri, source.offset);
        PendingEnrichment {
            request_id,
            source,
            future,
        }
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// No in-flight response is current any more.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }
}

/// An in-flight worker query. Drive it with [`PendingEnrichment::resolve`] and hand
/// the response back to the popup.
pub struct PendingEnrichment {
    request_id: RequestId,
    source: CompletionSource,
    future: LocalBoxFuture<'static, Result<Vec<WorkerCompletion>, WorkerError>>,
}

impl PendingEnrichment {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub async fn resolve(self) -> EnrichmentResponse {
        EnrichmentResponse {
            request_id: self.request_id,
            source: self.source,
            result: self.future.await,
        }
    }
}

impl fmt::Debug for PendingEnrichment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEnrichment")
            .field("request_id", &self.request_id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentResponse {
    pub request_id: RequestId,
    pub source: CompletionSource,
    pub result: Result<Vec<WorkerCompletion>, WorkerError>,
}

/// Merges worker completions into the synchronous list and returns the new active index.
///
/// Known labels are patched in place; new labels matching the typed segment are
/// appended as worker items. The active item stays selected by label when it survives.
pub fn merge_worker_items(
    items: &mut Vec<SuggestionItem>,
    active_index: usize,
    ctx: &ExpressionContext,
    source: &CompletionSource,
    completions: Vec<WorkerCompletion>,
) -> usize {
    let active_label = items.get(active_index).map(|item| item.label.clone());

    for completion in completions {
        if let Some(existing) = items.iter_mut().find(|item| item.label == completion.name) {
            existing.completion_source = Some(source.clone());
            existing.completion_data = Some(completion);
            continue;
        }
        if !completion.name.starts_with(ctx.segment_prefix.as_str()) {
            continue;
        }
        items.push(worker_item(ctx, source, completion));
    }
    sort_and_dedup(items);

    match active_label.and_then(|label| items.iter().position(|item| item.label == label)) {
        Some(index) => index,
        None if active_index >= items.len() => items.len().saturating_sub(1),
        None => 0,
    }
}

fn worker_item(
    ctx: &ExpressionContext,
    source: &CompletionSource,
    completion: WorkerCompletion,
) -> SuggestionItem {
    let mut item = SuggestionItem::new(completion.name.as_str(), ctx.full_path(&completion.name))
        .with_kind(
            Some(completion.kind.as_str())
                .filter(|kind| !kind.is_empty())
                .map(CompletionKind::from_name),
        );
    if let Some(insert_text) = completion.insert_text.as_deref().filter(|t| !t.is_empty()) {
        item.insert_text = insert_text.to_string();
    }
    item.source = SuggestionSource::Js;
    item.completion_source = Some(source.clone());
    item.completion_data = Some(completion);
    item
}
