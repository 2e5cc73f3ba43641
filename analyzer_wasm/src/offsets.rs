//! JS/editor boundary uses UTF-16 code units (CodeMirror positions).
//! Ranges are half-open `[start, end)`; `end` is exclusive.

use analyzer::Span;

use crate::dto::v1::Span as Utf16Span;

/// Byte offset of the UTF-16 position `utf16`, clamped to `source.len()`.
///
/// A position inside a surrogate pair resolves to the end of that character.
pub fn utf16_offset_to_byte(source: &str, utf16: usize) -> usize {
    if utf16 == 0 {
        return 0;
    }

    let mut u16_count = 0usize;
    for (byte_idx, ch) in source.char_indices() {
        if u16_count >= utf16 {
            return byte_idx;
        }
        u16_count += ch.len_utf16();
    }

    source.len()
}

/// UTF-16 position of the byte offset `byte`, clamped to the end of `source`.
pub fn byte_offset_to_utf16(source: &str, byte: usize) -> u32 {
    let end = byte.min(source.len());
    source
        .char_indices()
        .take_while(|(idx, _)| *idx < end)
        .map(|(_, ch)| ch.len_utf16() as u32)
        .sum()
}

pub fn byte_span_to_utf16(source: &str, span: Span) -> Utf16Span {
    Utf16Span {
        start: byte_offset_to_utf16(source, span.start as usize),
        end: byte_offset_to_utf16(source, span.end as usize),
    }
}
