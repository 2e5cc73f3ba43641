//! The editor collaborator, consumed through a narrow interface.
//!
//! Key, content-change and blur notifications are pushed by the host into
//! [`crate::Popup`] (`handle_key`, `refresh`, `blur`) rather than registered here.

use analyzer::{Span, TextEdit};
use serde::{Deserialize, Serialize};

use crate::text_edit::apply_text_edit;

/// Cursor rectangle in the editor's pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorCoords {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
}

pub trait Editor {
    /// Text of the cursor's line, up to the cursor.
    fn text_before_cursor(&self) -> String;
    /// Byte offset of the cursor in the whole buffer.
    fn cursor_offset(&self) -> u32;
    fn cursor_pixel_position(&self) -> Option<CursorCoords>;
    fn replace_range(&mut self, range: Span, text: &str);
    fn set_cursor(&mut self, offset: u32);
    /// Identifies the buffer to the language-service worker.
    fn buffer_uri(&self) -> &str;
}

/// A plain in-memory buffer. Useful for hosts without a widget and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBuffer {
    uri: String,
    text: String,
    cursor: u32,
    coords: Option<CursorCoords>,
}

impl TextBuffer {
    pub fn new(uri: impl Into<String>, text: impl Into<String>, cursor: u32) -> Self {
        let text = text.into();
        let cursor = cursor.min(text.len() as u32);
        Self {
            uri: uri.into(),
            text,
            cursor,
            coords: None,
        }
    }

    pub fn with_coords(mut self, coords: CursorCoords) -> Self {
        self.coords = Some(coords);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Inserts `text` at the cursor and moves the cursor past it.
    pub fn type_text(&mut self, text: &str) {
        let at = self.cursor;
        self.replace_range(Span::empty(at), text);
        self.cursor = at + text.len() as u32;
    }
}

impl Editor for TextBuffer {
    fn text_before_cursor(&self) -> String {
        let before = self.text.get(..self.cursor as usize).unwrap_or_default();
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        before[line_start..].to_string()
    }

    fn cursor_offset(&self) -> u32 {
        self.cursor
    }

    fn cursor_pixel_position(&self) -> Option<CursorCoords> {
        self.coords
    }

    fn replace_range(&mut self, range: Span, text: &str) {
        let edit = TextEdit::replace(range, text);
        match apply_text_edit(&mut self.text, &edit, self.cursor) {
            Ok(cursor) => self.cursor = cursor,
            Err(err) => tracing::warn!(%err, "ignoring invalid replacement"),
        }
    }

    fn set_cursor(&mut self, offset: u32) {
        let mut offset = offset.min(self.text.len() as u32);
        while !self.text.is_char_boundary(offset as usize) {
            offset -= 1;
        }
        self.cursor = offset;
    }

    fn buffer_uri(&self) -> &str {
        &self.uri
    }
}
