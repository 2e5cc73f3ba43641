//! Expression-context extraction for the text left of the cursor.
//!
//! Works on a single line: the caller passes the line up to the cursor column.
//! Markers never nest; only the last open marker on the line is considered.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Trailing identifier-and-dot chain, e.g. `user.profile` in `{{ user.profile`.
static TRAILING_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_$][\w$.]*$").expect("valid path regex"));

/// Trailing identifier characters (possibly empty).
static TRAILING_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w$]*$").expect("valid segment regex"));

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w$.])\d[\d_]*(?:\.\d+)?$").expect("valid number regex"));

/// Open/close delimiters of an embedded expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerPair {
    pub open: String,
    pub close: String,
}

impl Default for MarkerPair {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Literal receivers, each mapped to a fixed pseudo-type used for member lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl LiteralKind {
    /// `None` for `null`, which has no members.
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            Self::String => Some("String"),
            Self::Number => Some("Number"),
            Self::Boolean => Some("Boolean"),
            Self::Array => Some("Array"),
            Self::Object => Some("Object"),
            Self::Null => None,
        }
    }
}

/// What sits left of the member-access dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Receiver {
    /// `base_path` is a dotted identifier chain.
    Path,
    /// The value returned by calling `callee`, as in `callee().`.
    CallResult { callee: String },
    Literal { literal: LiteralKind },
    /// A receiver the extractor cannot classify, e.g. `(a + b).`.
    Unknown,
}

/// What the user is referencing at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionContext {
    /// Text between the open marker and the cursor, untrimmed.
    pub raw_prefix: String,
    pub has_dot: bool,
    /// Path left of the last dot (or the call owner for an empty call).
    pub base_path: String,
    /// Partially typed segment right of the last dot.
    pub segment_prefix: String,
    pub is_empty_call: bool,
    pub call_path: Option<String>,
    pub receiver: Receiver,
}

impl ExpressionContext {
    /// Full dotted path of the segment under the cursor.
    pub fn full_path(&self, segment: &str) -> String {
        if self.base_path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", self.base_path, segment)
        }
    }
}

/// Extracts the expression context for `line_before_cursor`.
///
/// Returns `None` when the cursor is not inside an open marker region.
pub fn extract_context(line_before_cursor: &str, markers: &MarkerPair) -> Option<ExpressionContext> {
    if markers.open.is_empty() {
        return None;
    }
    let open_at = line_before_cursor.rfind(markers.open.as_str())?;
    let expr = &line_before_cursor[open_at + markers.open.len()..];
    if !markers.close.is_empty() && expr.contains(markers.close.as_str()) {
        return None;
    }

    if let Some(ctx) = empty_call_context(expr) {
        return Some(ctx);
    }

    let segment = TRAILING_SEGMENT
        .find(expr)
        .map(|m| m.as_str())
        .unwrap_or_default();
    let before_segment = &expr[..expr.len() - segment.len()];

    let Some(receiver_src) = before_segment.strip_suffix('.') else {
        return Some(ExpressionContext {
            raw_prefix: expr.to_string(),
            has_dot: false,
            base_path: String::new(),
            segment_prefix: segment.to_string(),
            is_empty_call: false,
            call_path: None,
            receiver: Receiver::Path,
        });
    };

    let (base_path, receiver) = classify_receiver(receiver_src);
    Some(ExpressionContext {
        raw_prefix: expr.to_string(),
        has_dot: true,
        base_path,
        segment_prefix: segment.to_string(),
        is_empty_call: false,
        call_path: None,
        receiver,
    })
}

/// `foo.bar(` with nothing meaningful typed after the paren.
fn empty_call_context(expr: &str) -> Option<ExpressionContext> {
    let before_paren = expr.trim_end().strip_suffix('(')?;
    let callee = plain_trailing_path(before_paren.trim_end())?;
    let (owner, last) = match callee.rsplit_once('.') {
        Some((owner, last)) => (owner.to_string(), last.to_string()),
        None => (String::new(), callee.to_string()),
    };
    Some(ExpressionContext {
        raw_prefix: expr.to_string(),
        has_dot: false,
        base_path: owner,
        segment_prefix: last,
        is_empty_call: true,
        call_path: Some(callee.to_string()),
        receiver: Receiver::Path,
    })
}

/// Trailing dotted path that is not itself a member of something else (`x().a`)
/// and does not end in a dot.
fn plain_trailing_path(text: &str) -> Option<&str> {
    let found = TRAILING_PATH.find(text)?;
    let path = found.as_str();
    if path.ends_with('.') || path.contains("..") {
        return None;
    }
    let preceded_by_dot = text[..found.start()].ends_with('.');
    let preceded_by_digit = text[..found.start()]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit());
    if preceded_by_dot || preceded_by_digit {
        return None;
    }
    Some(path)
}

fn classify_receiver(src: &str) -> (String, Receiver) {
    let literal = |kind: LiteralKind| {
        let base = kind.type_name().unwrap_or("null").to_string();
        (base, Receiver::Literal { literal: kind })
    };

    let Some(last) = src.chars().next_back() else {
        return (String::new(), Receiver::Unknown);
    };

    match last {
        ')' => call_receiver(src),
        '"' | '\'' | '`' => literal(LiteralKind::String),
        ']' => {
            if is_index_access(src) {
                (String::new(), Receiver::Unknown)
            } else {
                literal(LiteralKind::Array)
            }
        }
        '}' => literal(LiteralKind::Object),
        _ if TRAILING_NUMBER.is_match(src) => literal(LiteralKind::Number),
        _ => match plain_trailing_path(src) {
            Some("true" | "false") => literal(LiteralKind::Boolean),
            Some("null") => literal(LiteralKind::Null),
            Some(path) => (path.to_string(), Receiver::Path),
            None => (String::new(), Receiver::Unknown),
        },
    }
}

fn call_receiver(src: &str) -> (String, Receiver) {
    let Some(open) = matching_open(src, '(', ')') else {
        return (String::new(), Receiver::Unknown);
    };
    match plain_trailing_path(src[..open].trim_end()) {
        Some(callee) => (
            format!("{callee}()"),
            Receiver::CallResult {
                callee: callee.to_string(),
            },
        ),
        None => (String::new(), Receiver::Unknown),
    }
}

/// `a[0]` (element access) rather than `[1, 2]` (array literal).
fn is_index_access(src: &str) -> bool {
    let Some(open) = matching_open(src, '[', ']') else {
        return false;
    };
    src[..open]
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | ')' | ']'))
}

/// Byte index of the bracket that opens the one closing `src`.
fn matching_open(src: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in src.char_indices().rev() {
        if ch == close {
            depth += 1;
        } else if ch == open {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}
