use analyzer::{DeclarationFile, Metadata};
use ide::CompletionConfig;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// JS/editor-facing span in UTF-16 code units.
///
/// Ranges are half-open `[start, end)`; `end` is exclusive.
#[derive(Serialize, TS, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

/// Input of `suggest`.
#[derive(Deserialize, TS, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SuggestInput {
    /// The editor line containing the cursor.
    pub line: String,
    /// Cursor column in UTF-16 code units.
    pub cursor: u32,
    #[serde(default)]
    #[ts(type = "Record<string, MetadataEntry>")]
    pub metadata: Metadata,
    /// Live value tree; plain JSON.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub values: Option<serde_json::Value>,
    #[serde(default)]
    #[ts(type = "{ markers?: { open?: string, close?: string }, enrichment?: boolean }")]
    pub config: CompletionConfig,
}

/// Metadata entry as accepted in `SuggestInput.metadata`.
#[derive(Serialize, TS, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    pub kind: Option<String>,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub append_dot: bool,
}

#[derive(Deserialize, TS, Debug)]
pub struct DeclarationFileInput {
    pub filename: String,
    pub content: String,
}

impl From<DeclarationFileInput> for DeclarationFile {
    fn from(input: DeclarationFileInput) -> Self {
        Self {
            filename: input.filename,
            content: input.content,
        }
    }
}

#[derive(Serialize, TS, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionSource {
    #[serde(rename = "context")]
    Context,
    #[serde(rename = "js")]
    Js,
}

#[derive(Serialize, TS, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionContext {
    pub raw_prefix: String,
    pub has_dot: bool,
    pub base_path: String,
    pub segment_prefix: String,
    pub is_empty_call: bool,
    pub call_path: Option<String>,
}

#[derive(Serialize, TS, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    pub label: String,
    pub insert_text: String,
    pub kind: Option<String>,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub full_path: String,
    pub append_dot: bool,
    pub source: SuggestionSource,
}

/// Output of `suggest`.
///
/// `replace` is in UTF-16 units of `SuggestInput.line`; `null` when there is nothing to
/// replace (no context, or a signature-only result).
#[derive(Serialize, TS, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResult {
    pub context: Option<ExpressionContext>,
    pub items: Vec<SuggestionItem>,
    pub replace: Option<Span>,
    pub signature_only: bool,
}

#[derive(Serialize, TS, Clone, Debug, PartialEq, Eq)]
pub struct FailedFile {
    pub filename: String,
    pub error: String,
}

/// Output of `load_declarations`.
#[derive(Serialize, TS, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub parsed: Vec<String>,
    pub failed: Vec<FailedFile>,
}
