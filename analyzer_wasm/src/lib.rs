//! Browser-host binding for the completion engine.
//!
//! The declaration index lives for the whole page in a thread-local store (wasm is
//! single-threaded); `suggest` is a pure query against it.

pub mod converter;
pub mod dto;
pub mod offsets;

use analyzer::{DeclarationFile, DeclarationStore, Globals};
use js_sys::Error as JsError;
use wasm_bindgen::prelude::*;

use crate::converter::Converter;
use crate::dto::v1::{DeclarationFileInput, FailedFile, LoadReport};

thread_local! {
    static STORE: DeclarationStore = DeclarationStore::new();
    static GLOBALS: Globals = Globals::well_known();
}

/// Parses and merges `{ filename, content }[]`. Files that fail to parse are reported
/// and skipped; everything else is merged first-wins into the page-wide index.
#[wasm_bindgen]
pub fn load_declarations(files: JsValue) -> Result<JsValue, JsValue> {
    let files: Vec<DeclarationFileInput> = serde_wasm_bindgen::from_value(files)
        .map_err(|err| JsValue::from(JsError::new(&format!("Invalid declaration files: {err}"))))?;
    let files: Vec<DeclarationFile> = files.into_iter().map(DeclarationFile::from).collect();

    let report = STORE.with(|store| store.ingest(&files));
    tracing::debug!(
        parsed = report.parsed.len(),
        failed = report.failed.len(),
        "page declarations loaded"
    );
    let view = LoadReport {
        parsed: report.parsed,
        failed: report
            .failed
            .into_iter()
            .map(|failed| FailedFile {
                filename: failed.filename,
                error: failed.error,
            })
            .collect(),
    };
    serde_wasm_bindgen::to_value(&view).map_err(JsValue::from)
}

/// Suggestions for the cursor position described by `input_json` (see `SuggestInput`).
#[wasm_bindgen]
pub fn suggest(input_json: String) -> Result<JsValue, JsValue> {
    let input =
        Converter::parse_suggest_input(&input_json).map_err(|err| Converter::js_error(&err))?;
    let result = STORE.with(|store| {
        let index = store.read();
        GLOBALS.with(|globals| Converter::suggest(input, &index, globals))
    });
    serde_wasm_bindgen::to_value(&result).map_err(JsValue::from)
}
