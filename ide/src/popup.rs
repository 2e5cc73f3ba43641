//! Popup session: visible state, keyboard semantics and commit.
//!
//! ```text
//! Closed --(context, >=1 item)--> Open --(Enter/Tab)--> Closed [--re-trigger--> Open]
//! Closed --(context, empty call)--> OpenSignature
//! Open | OpenSignature --(Escape, blur, cancel, no context)--> Closed
//! ```

use analyzer::{ExpressionContext, Span, TextEdit, extract_context};
use serde::Serialize;

use crate::completion::{CompletionSource, Sources, SuggestionItem, compute_suggestions};
use crate::config::CompletionConfig;
use crate::editor::Editor;
use crate::enrich::{
    EnrichmentCoordinator, EnrichmentResponse, LanguageService, PendingEnrichment,
    merge_worker_items,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PopupPhase {
    Closed,
    Open,
    OpenSignature,
}

/// Where the popup is rendered, in editor pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Anchor {
    pub top: f64,
    pub left: f64,
}

/// Render snapshot of the popup.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupState {
    pub open: bool,
    pub items: Vec<SuggestionItem>,
    pub active_index: usize,
    pub anchor: Anchor,
    /// Byte range replaced on commit. `None` while showing a signature.
    pub replace_range: Option<Span>,
    pub signature_only: bool,
}

impl PopupState {
    pub fn phase(&self) -> PopupPhase {
        match (self.open, self.signature_only) {
            (false, _) => PopupPhase::Closed,
            (true, false) => PopupPhase::Open,
            (true, true) => PopupPhase::OpenSignature,
        }
    }

    pub fn active_item(&self) -> Option<&SuggestionItem> {
        self.items.get(self.active_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Escape,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowDown" => Self::ArrowDown,
            "ArrowUp" => Self::ArrowUp,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Result of [`Popup::handle_key`].
#[derive(Debug, Default)]
pub struct KeyOutcome {
    /// The host should suppress the editor's default handling of the key.
    pub handled: bool,
    /// A worker query fired by a commit re-trigger.
    pub enrichment: Option<PendingEnrichment>,
}

impl KeyOutcome {
    fn handled() -> Self {
        Self {
            handled: true,
            enrichment: None,
        }
    }
}

type CommitCallback = Box<dyn FnMut(&SuggestionItem)>;

/// One popup session bound to an editor.
pub struct Popup {
    config: CompletionConfig,
    state: PopupState,
    context: Option<ExpressionContext>,
    enrichment: EnrichmentCoordinator,
    on_commit: Option<CommitCallback>,
}

impl Popup {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            state: PopupState::default(),
            context: None,
            enrichment: EnrichmentCoordinator::new(),
            on_commit: None,
        }
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn phase(&self) -> PopupPhase {
        self.state.phase()
    }

    pub fn context(&self) -> Option<&ExpressionContext> {
        self.context.as_ref()
    }

    /// Called with the committed item after the editor has been updated.
    pub fn on_commit(&mut self, callback: impl FnMut(&SuggestionItem) + 'static) {
        self.on_commit = Some(Box::new(callback));
    }

    /// Recomputes from the editor's current text (content change or cursor move).
    ///
    /// Returns the worker query to drive when the context is a member access and
    /// enrichment is enabled.
    pub fn refresh(
        &mut self,
        editor: &dyn Editor,
        sources: &Sources<'_>,
        service: Option<&dyn LanguageService>,
    ) -> Option<PendingEnrichment> {
        let line = editor.text_before_cursor();
        let Some(ctx) = extract_context(&line, &self.config.markers) else {
            self.close("left expression");
            return None;
        };

        let items = compute_suggestions(&ctx, sources);
        let anchor = editor
            .cursor_pixel_position()
            .map(|coords| Anchor {
                top: coords.bottom,
                left: coords.left,
            })
            .unwrap_or(self.state.anchor);

        if ctx.is_empty_call {
            tracing::debug!(call = ?ctx.call_path, "showing signature");
            self.enrichment.invalidate();
            self.state = PopupState {
                open: true,
                items,
                active_index: 0,
                anchor,
                replace_range: None,
                signature_only: true,
            };
            self.context = Some(ctx);
            return None;
        }

        if items.is_empty() {
            self.close("no suggestions");
            return None;
        }

        let cursor = editor.cursor_offset();
        let typed = ctx.segment_prefix.len() as u32;
        tracing::debug!(
            base = %ctx.base_path,
            prefix = %ctx.segment_prefix,
            items = items.len(),
            "popup open"
        );
        self.state = PopupState {
            open: true,
            items,
            active_index: 0,
            anchor,
            replace_range: Some(Span::new(cursor.saturating_sub(typed), cursor)),
            signature_only: false,
        };

        let pending = match service {
            Some(service) if ctx.has_dot && self.config.enrichment => {
                let source = CompletionSource {
                    buffer_uri: editor.buffer_uri().to_string(),
                    offset: cursor,
                };
                Some(self.enrichment.query(service, source))
            }
            _ => {
                self.enrichment.invalidate();
                None
            }
        };
        self.context = Some(ctx);
        pending
    }

    pub fn handle_key(
        &mut self,
        key: Key,
        editor: &mut dyn Editor,
        sources: &Sources<'_>,
        service: Option<&dyn LanguageService>,
    ) -> KeyOutcome {
        match (self.phase(), key) {
            (PopupPhase::Closed, _) => KeyOutcome::default(),
            (_, Key::Escape) => {
                self.close("escape");
                KeyOutcome::handled()
            }
            (PopupPhase::OpenSignature, _) => KeyOutcome::default(),
            (PopupPhase::Open, Key::ArrowDown) => {
                self.move_active(1);
                KeyOutcome::handled()
            }
            (PopupPhase::Open, Key::ArrowUp) => {
                self.move_active(-1);
                KeyOutcome::handled()
            }
            (PopupPhase::Open, Key::Enter | Key::Tab) => KeyOutcome {
                handled: true,
                enrichment: self.commit(editor, sources, service),
            },
            (PopupPhase::Open, Key::Other) => KeyOutcome::default(),
        }
    }

    /// Editor lost focus.
    pub fn blur(&mut self) {
        self.close("blur");
    }

    /// Explicit close requested by the host.
    pub fn cancel(&mut self) {
        self.close("cancel");
    }

    /// Merges a worker response. Returns whether popup state changed.
    ///
    /// Responses that are not for the latest query, arrive after close, or carry a
    /// worker failure leave the state untouched.
    pub fn apply_enrichment(&mut self, response: EnrichmentResponse) -> bool {
        if !self.enrichment.is_current(response.request_id) {
            tracing::trace!(request = response.request_id.get(), "discarding stale worker response");
            return false;
        }
        let (PopupPhase::Open, Some(ctx)) = (self.phase(), self.context.as_ref()) else {
            return false;
        };
        let completions = match response.result {
            Ok(completions) => completions,
            Err(err) => {
                tracing::debug!(%err, "worker query failed");
                return false;
            }
        };

        self.state.active_index = merge_worker_items(
            &mut self.state.items,
            self.state.active_index,
            ctx,
            &response.source,
            completions,
        );
        tracing::trace!(items = self.state.items.len(), "merged worker items");
        true
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.state.items.len();
        if len == 0 {
            return;
        }
        let next = (self.state.active_index as isize + delta).rem_euclid(len as isize);
        self.state.active_index = next as usize;
    }

    fn commit(
        &mut self,
        editor: &mut dyn Editor,
        sources: &Sources<'_>,
        service: Option<&dyn LanguageService>,
    ) -> Option<PendingEnrichment> {
        let item = self.state.active_item().cloned();
        let range = self.state.replace_range;
        self.close("commit");
        let (Some(item), Some(range)) = (item, range) else {
            return None;
        };

        let edit = TextEdit::replace(range, item.insert_text.as_str());
        editor.replace_range(edit.range, &edit.new_text);
        editor.set_cursor(edit.end_cursor());
        tracing::debug!(label = %item.label, "committed");

        if let Some(callback) = self.on_commit.as_mut() {
            callback(&item);
        }

        if item.insert_text.ends_with('.') || item.append_dot {
            return self.refresh(editor, sources, service);
        }
        None
    }

    fn close(&mut self, reason: &'static str) {
        self.enrichment.invalidate();
        self.context = None;
        if self.state.open {
            tracing::debug!(reason, "popup closed");
        }
        let anchor = self.state.anchor;
        self.state = PopupState {
            anchor,
            ..PopupState::default()
        };
    }
}

impl Default for Popup {
    fn default() -> Self {
        Self::new(CompletionConfig::default())
    }
}
