//! Conversion utilities for the WASM/JS boundary.
//!
//! Stateless: input parsing, UTF-16 to byte offset bridging, and conversion of
//! `analyzer`/`ide` types into `dto::v1::*` views.

mod input;
mod suggest;

use wasm_bindgen::prelude::JsValue;

use crate::dto::v1::SuggestInput;
use crate::offsets::utf16_offset_to_byte;

pub use input::InputError;

pub struct Converter;

impl Converter {
    /// Parse the JS-provided suggest input JSON.
    pub fn parse_suggest_input(input_json: &str) -> Result<SuggestInput, InputError> {
        input::parse_suggest_input(input_json)
    }

    /// Convert a UTF-16 cursor offset (CodeMirror) to a byte offset (Rust strings).
    pub fn cursor_utf16_to_byte(source: &str, cursor_utf16: usize) -> usize {
        utf16_offset_to_byte(source, cursor_utf16)
    }

    pub fn js_error(err: &InputError) -> JsValue {
        JsValue::from(js_sys::Error::new(&err.to_string()))
    }
}
