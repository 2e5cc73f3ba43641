//! Synchronous suggestion aggregation.
//!
//! Combines three layered sources into one sorted, label-unique list:
//! the explicit metadata map, the live value tree (with the injected globals as
//! fallback), and the declaration index.

use analyzer::{DeclarationIndex, ExpressionContext, Globals, MemberKind, Metadata, Value};
use serde::{Serialize, Serializer};

use crate::enrich::WorkerCompletion;

mod items;
mod types;

/// Where a suggestion first came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionSource {
    /// Metadata, value tree or declaration index.
    Context,
    /// The language-service worker.
    Js,
}

/// What a suggestion completes to. Serialized as its lowercase name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionKind {
    Property,
    Method,
    Function,
    Object,
    /// The pseudo-item shown for an empty call.
    Signature,
    /// A kind string supplied by host metadata or the worker.
    Other(String),
}

impl CompletionKind {
    /// Maps a host-supplied kind name. `signature` is reserved for empty calls.
    pub fn from_name(name: &str) -> Self {
        match name {
            "property" => Self::Property,
            "method" => Self::Method,
            "function" => Self::Function,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Property => "property",
            Self::Method => "method",
            Self::Function => "function",
            Self::Object => "object",
            Self::Signature => "signature",
            Self::Other(name) => name,
        }
    }
}

impl From<MemberKind> for CompletionKind {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Function => Self::Function,
            MemberKind::Object => Self::Object,
        }
    }
}

impl Serialize for CompletionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Worker query that produced (or confirmed) a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSource {
    pub buffer_uri: String,
    pub offset: u32,
}

/// One completion candidate. Labels are unique within a popup session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    pub label: String,
    pub insert_text: String,
    pub kind: Option<CompletionKind>,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub full_path: String,
    pub append_dot: bool,
    pub source: SuggestionSource,
    pub completion_source: Option<CompletionSource>,
    pub completion_data: Option<WorkerCompletion>,
}

impl SuggestionItem {
    /// Creates a context-sourced item; `insert_text` defaults to `label`.
    pub fn new(label: impl Into<String>, full_path: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            kind: None,
            detail: None,
            documentation: None,
            full_path: full_path.into(),
            append_dot: false,
            source: SuggestionSource::Context,
            completion_source: None,
            completion_data: None,
        }
    }

    pub fn with_kind(mut self, kind: Option<CompletionKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail.filter(|d| !d.is_empty());
        self
    }

    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation.filter(|d| !d.is_empty());
        self
    }

    /// Marks the item as having members; committing it inserts a trailing `.`.
    pub fn with_append_dot(mut self, append_dot: bool) -> Self {
        self.append_dot = append_dot;
        if append_dot && !self.insert_text.ends_with('.') {
            self.insert_text.push('.');
        }
        self
    }

    pub fn is_signature(&self) -> bool {
        self.kind == Some(CompletionKind::Signature)
    }
}

/// Everything the aggregator reads from. All borrowed; nothing is mutated.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub metadata: &'a Metadata,
    pub values: Option<&'a Value>,
    pub globals: &'a Globals,
    pub index: &'a DeclarationIndex,
}

/// Computes the synchronous suggestion list for `ctx`.
///
/// The result is sorted by label and has no duplicate labels. An empty call yields a
/// single signature item for the callee instead of a member list.
pub fn compute_suggestions(ctx: &ExpressionContext, sources: &Sources<'_>) -> Vec<SuggestionItem> {
    if ctx.is_empty_call {
        return vec![items::signature_item(ctx, sources)];
    }
    let items = if ctx.has_dot {
        items::member_items(ctx, sources)
    } else {
        items::root_items(ctx, sources)
    };
    tracing::trace!(
        base = %ctx.base_path,
        prefix = %ctx.segment_prefix,
        count = items.len(),
        "computed suggestions"
    );
    items
}

/// Sorts by label (stable) and keeps the first item of each label.
///
/// Fields the kept item lacks are filled from the dropped duplicates, so an explicit
/// metadata item still picks up documentation found in the declaration index.
pub(crate) fn sort_and_dedup(items: &mut Vec<SuggestionItem>) {
    fn fill<T>(slot: &mut Option<T>, value: &mut Option<T>) {
        if slot.is_none() {
            *slot = value.take();
        }
    }

    items.sort_by(|a, b| a.label.cmp(&b.label));
    items.dedup_by(|later, earlier| {
        if later.label != earlier.label {
            return false;
        }
        fill(&mut earlier.kind, &mut later.kind);
        fill(&mut earlier.detail, &mut later.detail);
        fill(&mut earlier.documentation, &mut later.documentation);
        true
    });
}
