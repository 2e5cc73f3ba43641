//! Declaration-source indexer.
//!
//! Parses interface / namespace / global-var declarations into a [`DeclarationIndex`]
//! of member names and member docs. Parsing is lenient: bodies are extracted by brace
//! counting and members by pattern matching, never by a full grammar.
//!
//! Merging is a first-wins union: once a key holds a non-empty value, later parses
//! never overwrite it.

mod scan;
mod store;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use scan::{
    Chunk, body_open, brace_depths, clean_doc, doc_comment_before, mask_trivia, matching_brace,
    normalize_signature, split_top_level,
};

pub use store::{
    DeclarationFile, DeclarationLoader, DeclarationStore, FailedFile, LoadError, LoadReport,
};

static GLOBAL_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdeclare\s+var\s+([A-Za-z_$][\w$]*)\s*:\s*([^;]+);")
        .expect("valid global var regex")
});

static INTERFACE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\binterface\s+([A-Za-z_$][\w$]*)").expect("valid interface regex")
});

static NAMESPACE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:namespace|module)\s+([A-Za-z_$][\w$.]*)\s*\{").expect("valid namespace regex")
});

static MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:readonly\s+)?(?:(?:get|set)\s+)?([A-Za-z_$][\w$]*)(\??)\s*([(:<][\s\S]*)$")
        .expect("valid member regex")
});

static NAMESPACE_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:export\s+)?(?:declare\s+)?(var|let|const|function|class|namespace)\s+([A-Za-z_$][\w$]*)([\s\S]*)$",
    )
    .expect("valid namespace statement regex")
});

/// A malformed declaration source. Reported per file; the file is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("unbalanced braces in {kind} `{name}` at byte {offset}")]
    UnbalancedBraces {
        kind: &'static str,
        name: String,
        offset: usize,
    },
    #[error("unterminated block comment at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("unterminated string literal at byte {offset}")]
    UnterminatedString { offset: usize },
}

impl DeclarationError {
    pub fn offset(&self) -> usize {
        match self {
            Self::UnbalancedBraces { offset, .. }
            | Self::UnterminatedComment { offset }
            | Self::UnterminatedString { offset } => *offset,
        }
    }
}

/// How a namespace member can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Function,
    Object,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Object => "object",
        }
    }
}

/// Documentation attached to `Type.member`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDoc {
    pub detail: Option<String>,
    pub documentation: Option<String>,
}

impl MemberDoc {
    /// Fills fields that are still empty; never replaces a non-empty value.
    fn fill_from(&mut self, other: MemberDoc) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            let empty = slot.as_deref().is_none_or(str::is_empty);
            if empty && value.as_deref().is_some_and(|v| !v.is_empty()) {
                *slot = value;
            }
        }
        fill(&mut self.detail, other.detail);
        fill(&mut self.documentation, other.documentation);
    }
}

/// Process-wide index of declared types and their members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationIndex {
    pub global_aliases: BTreeMap<String, String>,
    pub members_by_type: BTreeMap<String, BTreeSet<String>>,
    pub docs_by_member: BTreeMap<String, MemberDoc>,
    pub namespace_member_kinds: BTreeMap<String, BTreeMap<String, MemberKind>>,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.global_aliases.is_empty()
            && self.members_by_type.is_empty()
            && self.docs_by_member.is_empty()
            && self.namespace_member_kinds.is_empty()
    }

    /// Parses `text` and merges it in. On error nothing from `text` is merged.
    pub fn ingest(&mut self, text: &str) -> Result<(), DeclarationError> {
        let parsed = parse_declarations(text)?;
        self.merge(parsed);
        Ok(())
    }

    /// First-wins union of `other` into `self`.
    pub fn merge(&mut self, other: DeclarationIndex) {
        for (name, ty) in other.global_aliases {
            self.global_aliases.entry(name).or_insert(ty);
        }
        for (ty, members) in other.members_by_type {
            self.members_by_type.entry(ty).or_default().extend(members);
        }
        for (key, doc) in other.docs_by_member {
            self.docs_by_member.entry(key).or_default().fill_from(doc);
        }
        for (ns, kinds) in other.namespace_member_kinds {
            let slot = self.namespace_member_kinds.entry(ns).or_default();
            for (member, kind) in kinds {
                slot.entry(member).or_insert(kind);
            }
        }
    }

    pub fn members_of(&self, type_name: &str) -> Option<&BTreeSet<String>> {
        self.members_by_type.get(type_name)
    }

    pub fn doc(&self, type_name: &str, member: &str) -> Option<&MemberDoc> {
        self.docs_by_member.get(&format!("{type_name}.{member}"))
    }

    pub fn global_alias(&self, name: &str) -> Option<&str> {
        self.global_aliases.get(name).map(String::as_str)
    }

    pub fn namespace_member_kind(&self, namespace: &str, member: &str) -> Option<MemberKind> {
        self.namespace_member_kinds.get(namespace)?.get(member).copied()
    }

    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespace_member_kinds.contains_key(name)
    }

    fn add_member(&mut self, owner: &str, member: &str, doc: MemberDoc) {
        self.members_by_type
            .entry(owner.to_string())
            .or_default()
            .insert(member.to_string());
        self.docs_by_member
            .entry(format!("{owner}.{member}"))
            .or_default()
            .fill_from(doc);
    }
}

/// Parses one declaration source into a fresh index.
pub fn parse_declarations(text: &str) -> Result<DeclarationIndex, DeclarationError> {
    let masked = mask_trivia(text)?;
    let depths = brace_depths(&masked);
    let mut index = DeclarationIndex::new();

    collect_global_aliases(&masked, &depths, &mut index);
    collect_interfaces(text, &masked, &mut index)?;
    collect_namespaces(text, &masked, &depths, &mut index)?;

    Ok(index)
}

/// Human-readable 1-based `line:col` for a parse error, for logging.
pub fn error_location(text: &str, err: &DeclarationError) -> String {
    let offset = err.offset().min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|b| *b == b'\n').map_or(0, |p| p + 1);
    format!("{line}:{}", offset - line_start + 1)
}

fn collect_global_aliases(masked: &str, depths: &[u32], index: &mut DeclarationIndex) {
    for caps in GLOBAL_VAR.captures_iter(masked) {
        let (Some(whole), Some(name), Some(ty)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if depths.get(whole.start()).copied().unwrap_or(0) != 0 {
            continue;
        }
        let Some(ty) = primary_type_name(ty.as_str()) else {
            continue;
        };
        index
            .global_aliases
            .entry(name.as_str().to_string())
            .or_insert_with(|| ty.to_string());
    }
}

/// First named type of an intersection or union: `Window & typeof globalThis` is `Window`.
fn primary_type_name(ty: &str) -> Option<&str> {
    ty.split(['&', '|'])
        .map(str::trim)
        .filter(|part| !part.starts_with("typeof "))
        .find_map(|part| {
            let end = part
                .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.')))
                .unwrap_or(part.len());
            let name = &part[..end];
            let named = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
                && !matches!(name, "null" | "undefined" | "void" | "never");
            named.then_some(name)
        })
}

fn collect_interfaces(
    text: &str,
    masked: &str,
    index: &mut DeclarationIndex,
) -> Result<(), DeclarationError> {
    for caps in INTERFACE_HEADER.captures_iter(masked) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let Some(open) = body_open(masked, name.end()) else {
            continue;
        };
        let close = matching_brace(masked, open).ok_or_else(|| DeclarationError::UnbalancedBraces {
            kind: "interface",
            name: name.as_str().to_string(),
            offset: open,
        })?;

        for chunk in split_top_level(masked, open + 1, close) {
            if let Some((member, doc)) = interface_member(text, &chunk) {
                index.add_member(name.as_str(), &member, doc);
            }
        }
    }
    Ok(())
}

fn interface_member(text: &str, chunk: &Chunk) -> Option<(String, MemberDoc)> {
    let code = text.get(chunk.start..chunk.end)?;
    let caps = MEMBER.captures(code)?;
    let name = caps.get(1)?.as_str();
    let optional = caps.get(2).map_or("", |m| m.as_str());
    let tail = caps.get(3)?.as_str();

    // Construct signatures look like a method named `new`.
    if name == "new" && tail.starts_with('(') {
        return None;
    }

    let doc = MemberDoc {
        detail: Some(format!("{name}{optional}{}", normalize_signature(tail))),
        documentation: doc_comment_before(text, chunk.lead_start, chunk.start)
            .map(clean_doc)
            .filter(|d| !d.is_empty()),
    };
    Some((name.to_string(), doc))
}

fn collect_namespaces(
    text: &str,
    masked: &str,
    depths: &[u32],
    index: &mut DeclarationIndex,
) -> Result<(), DeclarationError> {
    for caps in NAMESPACE_HEADER.captures_iter(masked) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Nested namespaces are reached through their parent with a qualified name.
        if depths.get(whole.start()).copied().unwrap_or(0) != 0 {
            continue;
        }
        namespace_body(text, masked, name.as_str(), whole.end() - 1, index)?;
    }
    Ok(())
}

fn namespace_body(
    text: &str,
    masked: &str,
    namespace: &str,
    open: usize,
    index: &mut DeclarationIndex,
) -> Result<(), DeclarationError> {
    let close = matching_brace(masked, open).ok_or_else(|| DeclarationError::UnbalancedBraces {
        kind: "namespace",
        name: namespace.to_string(),
        offset: open,
    })?;

    index.namespace_member_kinds.entry(namespace.to_string()).or_default();

    for chunk in split_top_level(masked, open + 1, close) {
        let Some(code) = text.get(chunk.start..chunk.end) else {
            continue;
        };
        let Some(caps) = NAMESPACE_STATEMENT.captures(code) else {
            continue;
        };
        let (Some(keyword), Some(name), Some(rest)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let keyword = keyword.as_str();
        let name = name.as_str();

        let kind = match keyword {
            "function" | "class" | "const" => MemberKind::Function,
            _ => MemberKind::Object,
        };
        let detail = match keyword {
            "class" => {
                let header = rest.as_str().split('{').next().unwrap_or_default();
                normalize_signature(&format!("class {name} {header}"))
            }
            "namespace" => format!("namespace {namespace}.{name}"),
            _ => format!("{name}{}", normalize_signature(body_free(rest.as_str()))),
        };
        let doc = MemberDoc {
            detail: Some(detail),
            documentation: doc_comment_before(text, chunk.lead_start, chunk.start)
                .map(clean_doc)
                .filter(|d| !d.is_empty()),
        };

        index.add_member(namespace, name, doc);
        index
            .namespace_member_kinds
            .entry(namespace.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert(kind);

        if keyword == "namespace" {
            let nested_open = chunk.start
                + masked[chunk.start..chunk.end]
                    .find('{')
                    .unwrap_or(chunk.end - chunk.start);
            if nested_open < chunk.end {
                namespace_body(text, masked, &format!("{namespace}.{name}"), nested_open, index)?;
            }
        }
    }
    Ok(())
}

/// Statement text with any trailing `{ ... }` body dropped.
fn body_free(rest: &str) -> &str {
    rest.split('{').next().unwrap_or(rest)
}
