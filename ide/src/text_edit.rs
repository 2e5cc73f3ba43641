use analyzer::TextEdit;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {start}..{end} is outside a buffer of {len} bytes")]
    OutOfBounds { start: u32, end: u32, len: usize },
    #[error("edit range {start}..{end} splits a UTF-8 character")]
    NotCharBoundary { start: u32, end: u32 },
}

/// Applies one byte-offset edit in place and rebases a byte cursor through it.
///
/// Cursor rules:
/// - a cursor at or after the edit `end` shifts by the byte delta
/// - a cursor strictly inside the replaced range snaps to the edit `start`
pub fn apply_text_edit(buffer: &mut String, edit: &TextEdit, cursor: u32) -> Result<u32, EditError> {
    let (start, end) = (edit.range.start, edit.range.end);
    let (start_usize, end_usize) = (start as usize, end as usize);
    if start > end || end_usize > buffer.len() {
        return Err(EditError::OutOfBounds {
            start,
            end,
            len: buffer.len(),
        });
    }
    if !buffer.is_char_boundary(start_usize) || !buffer.is_char_boundary(end_usize) {
        return Err(EditError::NotCharBoundary { start, end });
    }

    buffer.replace_range(start_usize..end_usize, &edit.new_text);

    let inserted = edit.new_text.len() as i64;
    let removed = i64::from(end - start);
    let rebased = if end <= cursor {
        (i64::from(cursor) + inserted - removed).max(0) as u32
    } else if start < cursor {
        start
    } else {
        cursor
    };
    Ok(rebased)
}
