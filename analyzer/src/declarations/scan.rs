//! Lenient brace-balanced scanning over declaration sources.
//!
//! Scanning works on a *masked* copy of the source: comments and string contents are
//! blanked to spaces (newlines kept) so brace counting and pattern matching never see
//! them. The mask has the same byte length as the source, so offsets are shared.

use super::DeclarationError;

/// Blanks comments and string-literal contents, keeping quotes and newlines.
pub(crate) fn mask_trivia(text: &str) -> Result<String, DeclarationError> {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0usize;

    let blank = |out: &mut Vec<u8>, from: usize, to: usize| {
        for b in &mut out[from..to] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    };

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map_or(bytes.len(), |p| i + p);
                blank(&mut out, i, end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = find_block_comment_end(bytes, i + 2)
                    .ok_or(DeclarationError::UnterminatedComment { offset: i })?;
                blank(&mut out, i, end);
                i = end;
            }
            quote @ (b'"' | b'\'' | b'`') => {
                let mut j = i + 1;
                loop {
                    match bytes.get(j) {
                        None => return Err(DeclarationError::UnterminatedString { offset: i }),
                        Some(b'\\') => j += 2,
                        Some(b'\n') if quote != b'`' => {
                            return Err(DeclarationError::UnterminatedString { offset: i });
                        }
                        Some(b) if *b == quote => break,
                        Some(_) => j += 1,
                    }
                }
                let end = j.min(bytes.len());
                blank(&mut out, i + 1, end);
                i = end + 1;
            }
            _ => i += 1,
        }
    }

    // Every replaced byte is ASCII and whole characters were replaced, so this is lossless.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn find_block_comment_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(2)
        .position(|w| w == b"*/")
        .map(|p| from + p + 2)
}

/// Brace depth before each byte of `masked`.
pub(crate) fn brace_depths(masked: &str) -> Vec<u32> {
    let mut depths = Vec::with_capacity(masked.len());
    let mut depth = 0u32;
    for b in masked.bytes() {
        depths.push(depth);
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depths
}

/// Byte index of the `}` matching the `{` at `open`.
pub(crate) fn matching_brace(masked: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, b) in masked.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the `{` opening a declaration body, scanning the header from `from`.
///
/// Braces inside `<...>` (type parameter constraints, defaults, heritage arguments) are
/// skipped. `None` when the header ends at `;` or `}` before any body.
pub(crate) fn body_open(masked: &str, from: usize) -> Option<usize> {
    let bytes = masked.as_bytes();
    let mut angle = 0u32;
    for (i, b) in bytes.iter().enumerate().skip(from) {
        match *b {
            b'<' => angle += 1,
            b'>' if is_arrow(bytes, i) => {}
            b'>' => angle = angle.saturating_sub(1),
            b'{' if angle == 0 => return Some(i),
            b';' | b'}' if angle == 0 => return None,
            _ => {}
        }
    }
    None
}

/// `>` that closes `=>` rather than a type argument list.
fn is_arrow(bytes: &[u8], i: usize) -> bool {
    i > 0 && bytes[i - 1] == b'='
}

/// One top-level member or statement inside a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunk {
    /// Absolute byte range of the code (trimmed, comments excluded).
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// Absolute byte range where a preceding doc comment may live.
    pub(crate) lead_start: usize,
}

/// Splits `masked[body_start..body_end]` into top-level chunks.
///
/// Chunks end at `;` or at a newline, both only at nesting depth zero. A newline does
/// not end a chunk that is visibly unfinished (`a:`, `| "b"` continuations).
pub(crate) fn split_top_level(masked: &str, body_start: usize, body_end: usize) -> Vec<Chunk> {
    let bytes = masked.as_bytes();
    let mut chunks = Vec::new();
    let mut depth = 0i32;
    let mut chunk_start = body_start;

    let flush = |from: usize, to: usize, chunks: &mut Vec<Chunk>| {
        let slice = &masked[from..to];
        let trimmed_start = slice.len() - slice.trim_start().len();
        let trimmed = slice.trim();
        if !trimmed.is_empty() {
            let start = from + trimmed_start;
            chunks.push(Chunk {
                start,
                end: start + trimmed.len(),
                lead_start: from,
            });
        }
    };

    let mut i = body_start;
    while i < body_end {
        match bytes[i] {
            b'{' | b'(' | b'[' | b'<' => depth += 1,
            b'>' if is_arrow(bytes, i) => {}
            b'}' | b')' | b']' | b'>' => depth -= 1,
            b';' if depth <= 0 => {
                flush(chunk_start, i, &mut chunks);
                chunk_start = i + 1;
            }
            b'\n' if depth <= 0 => {
                let pending = masked[chunk_start..i].trim_end();
                let next = masked[i..body_end].trim_start();
                if !pending.trim().is_empty()
                    && !ends_with_continuation(pending)
                    && !starts_with_continuation(next)
                {
                    flush(chunk_start, i, &mut chunks);
                    chunk_start = i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    flush(chunk_start, body_end, &mut chunks);
    chunks
}

fn ends_with_continuation(pending: &str) -> bool {
    [":", "|", "&", ",", "=>", "=", "extends"]
        .iter()
        .any(|tail| pending.ends_with(tail))
}

fn starts_with_continuation(next: &str) -> bool {
    next.starts_with('|') || next.starts_with('&') || next.starts_with("=>")
}

/// The last `/** ... */` block in `source[from..to]` that only whitespace follows.
pub(crate) fn doc_comment_before(source: &str, from: usize, to: usize) -> Option<&str> {
    let lead = source.get(from..to)?;
    let open = lead.rfind("/**")?;
    let close = lead[open..].find("*/")? + open;
    if !lead[close + 2..].trim().is_empty() {
        return None;
    }
    Some(&lead[open + 3..close])
}

/// Strips comment asterisks and surrounding whitespace from a doc-comment body.
pub(crate) fn clean_doc(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.trim()
        })
        .collect();

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

/// Collapses whitespace runs to a single space.
pub(crate) fn normalize_signature(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
