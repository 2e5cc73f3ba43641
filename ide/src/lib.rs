//! Editor-facing completion for embedded expressions.
//!
//! Coordinates are UTF-8 byte offsets (`[start, end)`), matching `analyzer`.
//! Everything here runs on the host's UI thread; the only suspension point is the
//! language-service query, which the host drives and feeds back into [`Popup`].

mod completion;
mod config;
mod editor;
mod enrich;
mod popup;
mod text_edit;

pub use analyzer::TextEdit;
pub use completion::{
    CompletionKind, CompletionSource, Sources, SuggestionItem, SuggestionSource, compute_suggestions,
};
pub use config::CompletionConfig;
pub use editor::{CursorCoords, Editor, TextBuffer};
pub use enrich::{
    EnrichmentCoordinator, EnrichmentResponse, LanguageService, PendingEnrichment, RequestId,
    WorkerCompletion, WorkerError, merge_worker_items,
};
pub use popup::{Anchor, Key, KeyOutcome, Popup, PopupPhase, PopupState};
pub use text_edit::{EditError, apply_text_edit};

#[cfg(test)]
mod tests;
