//! Type-name resolution for receivers: live values, metadata kinds, declared
//! aliases, and return types read back from documented signatures.

use analyzer::{DeclarationIndex, ExpressionContext, Receiver, Value};

use super::Sources;

const FUNCTION_TYPES: [&str; 3] = ["Function", "CallableFunction", "NewableFunction"];

/// Types whose members only describe "being callable".
pub(super) fn is_function_type(name: &str) -> bool {
    FUNCTION_TYPES.contains(&name)
}

/// Resolves the live value at `path`: value tree first, then the globals table.
pub(super) fn resolve_value<'a>(path: &str, sources: &Sources<'a>) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    sources
        .values
        .and_then(|tree| tree.lookup_path(path))
        .or_else(|| sources.globals.lookup_path(path))
}

#[derive(Debug, Default)]
struct TypeNames(Vec<String>);

impl TypeNames {
    fn push(&mut self, name: &str) {
        if !name.is_empty() && !self.0.iter().any(|n| n == name) {
            self.0.push(name.to_string());
        }
    }
}

/// Candidate declared type names for whatever sits left of the dot.
pub(super) fn receiver_types(
    ctx: &ExpressionContext,
    value: Option<&Value>,
    sources: &Sources<'_>,
) -> Vec<String> {
    match &ctx.receiver {
        Receiver::Path => path_types(&ctx.base_path, value, sources),
        Receiver::CallResult { callee } => call_return_type(callee, sources).into_iter().collect(),
        Receiver::Literal { literal } => literal
            .type_name()
            .map(|name| vec![name.to_string()])
            .unwrap_or_default(),
        Receiver::Unknown => Vec::new(),
    }
}

/// Type names for the value at `path`: runtime tag or constructor name, declared
/// metadata kind, declared alias type, and the path itself when it names a namespace.
pub(super) fn path_types(path: &str, value: Option<&Value>, sources: &Sources<'_>) -> Vec<String> {
    let mut names = TypeNames::default();

    match value {
        // Plain objects are described by their own keys, not by `Object`'s members.
        Some(object @ Value::Object(_)) => {
            if let Some(class_name) = object.class_name() {
                names.push(class_name);
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => names.push(other.type_tag()),
    }

    if let Some(kind) = sources.metadata.get(path).and_then(|e| e.kind.as_deref()) {
        names.push(kind);
    }
    if let Some(declared) = declared_path_type(path, sources.index) {
        names.push(&declared);
    }
    if sources.index.is_namespace(path) {
        names.push(path);
    }

    names.0
}

/// Follows global aliases, namespaces and documented property types along `path`.
fn declared_path_type(path: &str, index: &DeclarationIndex) -> Option<String> {
    let mut segments = path.split('.');
    let root = segments.next()?;
    let mut ty = match index.global_alias(root) {
        Some(alias) => alias.to_string(),
        None if index.is_namespace(root) => root.to_string(),
        None => return None,
    };

    for segment in segments {
        let qualified = format!("{ty}.{segment}");
        if index.is_namespace(&qualified) {
            ty = qualified;
            continue;
        }
        let detail = index.doc(&ty, segment)?.detail.as_deref()?;
        ty = property_type(detail)?;
    }
    Some(ty)
}

/// Declared type of a property detail such as `document: Document`.
fn property_type(detail: &str) -> Option<String> {
    let rest = skip_name(detail);
    let ty = rest.strip_prefix(':')?.trim_start();
    if ty.starts_with('(') {
        return Some("Function".to_string());
    }
    normalize_type_name(ty)
}

/// Type returned by calling `callee`, read from its documented signature.
pub(super) fn call_return_type(callee: &str, sources: &Sources<'_>) -> Option<String> {
    let (owner, name) = callee.rsplit_once('.').unwrap_or(("", callee));

    if !owner.is_empty() {
        let owner_value = resolve_value(owner, sources);
        for ty in path_types(owner, owner_value, sources) {
            let detail = sources
                .index
                .doc(&ty, name)
                .and_then(|doc| doc.detail.as_deref());
            if let Some(ret) = detail.and_then(return_type) {
                return Some(ret);
            }
        }
    }

    sources
        .metadata
        .get(callee)
        .and_then(|entry| entry.detail.as_deref())
        .and_then(return_type)
}

/// Return type of a documented signature: `name(args): R`, `name<T>(args): R`, or a
/// function-typed property `name: (args) => R`.
pub(super) fn return_type(detail: &str) -> Option<String> {
    let mut rest = skip_name(detail);
    if let Some(ty) = rest.strip_prefix(':') {
        rest = ty.trim_start();
    }
    rest = skip_balanced(rest, '<', '>').unwrap_or(rest).trim_start();
    let after_params = skip_balanced(rest, '(', ')')?.trim_start();
    let ty = after_params
        .strip_prefix("=>")
        .or_else(|| after_params.strip_prefix(':'))?;
    normalize_type_name(ty)
}

fn skip_name(detail: &str) -> &str {
    detail
        .trim_start()
        .trim_start_matches(|c: char| c.is_alphanumeric() || c == '_' || c == '$')
        .trim_start_matches('?')
        .trim_start()
}

/// If `text` opens with `open`, returns the text after its matching `close`.
fn skip_balanced(text: &str, open: char, close: char) -> Option<&str> {
    if !text.starts_with(open) {
        return None;
    }
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            // `=>` inside generic arguments is not a closing angle bracket.
            if close == '>' && text[..idx].ends_with('=') {
                continue;
            }
            depth -= 1;
            if depth == 0 {
                return Some(&text[idx + close.len_utf8()..]);
            }
        }
    }
    None
}

/// Maps a written type to the name members are indexed under.
///
/// `string[]` and `Array<T>` become `Array`, primitive keywords become their wrapper
/// names, nullable unions drop `null`/`undefined`, and anything else that is not a
/// plain (dotted) type name resolves to `None`.
pub(super) fn normalize_type_name(raw: &str) -> Option<String> {
    let ty = raw.trim().trim_end_matches(';').trim();

    let members: Vec<&str> = split_union(ty)
        .into_iter()
        .map(str::trim)
        .filter(|m| !matches!(*m, "" | "null" | "undefined"))
        .collect();
    let [ty] = members.as_slice() else {
        return None;
    };

    if ty.ends_with("[]") {
        return Some("Array".to_string());
    }
    let base = ty.split('<').next().unwrap_or(ty).trim();
    let name = match base {
        "string" => "String",
        "number" => "Number",
        "boolean" => "Boolean",
        "object" => "Object",
        "any" | "unknown" | "void" | "never" => return None,
        other if analyzer::value::is_identifier(other.split('.').next_back().unwrap_or("")) => {
            other
        }
        _ => return None,
    };
    Some(name.to_string())
}

/// Splits on `|` outside of `<...>`, `(...)` and `{...}`.
fn split_union(ty: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (idx, ch) in ty.char_indices() {
        match ch {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' if !ty[..idx].ends_with('=') => depth -= 1,
            ')' | '}' | ']' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(&ty[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&ty[start..]);
    parts
}
