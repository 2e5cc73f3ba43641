use analyzer::metadata::MetadataChild;
use analyzer::{DeclarationIndex, ExpressionContext, Metadata, Receiver, Value};

use super::types::{is_function_type, path_types, receiver_types, resolve_value};
use super::{CompletionKind, SuggestionItem, Sources, sort_and_dedup};

/// Members of the receiver left of the dot.
pub(super) fn member_items(ctx: &ExpressionContext, sources: &Sources<'_>) -> Vec<SuggestionItem> {
    if ctx.receiver == Receiver::Unknown {
        return Vec::new();
    }
    let prefix = ctx.segment_prefix.as_str();
    let base = ctx.base_path.as_str();

    let explicit = metadata_items(sources.metadata, base, prefix);

    let value = match ctx.receiver {
        Receiver::Path => resolve_value(base, sources),
        _ => None,
    };
    let introspected = match value {
        Some(value) if explicit.is_empty() => introspected_items(ctx, value),
        _ => Vec::new(),
    };

    let type_names = receiver_types(ctx, value, sources);
    let typed = typed_items(ctx, &type_names, sources.index);

    // Documented members describe a live value better than its raw own keys, unless
    // the only documented type is "some function".
    let prefer_typed = !typed.is_empty()
        && !introspected.is_empty()
        && type_names.iter().any(|name| {
            !is_function_type(name)
                && sources
                    .index
                    .members_of(name)
                    .is_some_and(|members| !members.is_empty())
        });

    tracing::trace!(
        base,
        ?type_names,
        explicit = explicit.len(),
        introspected = introspected.len(),
        typed = typed.len(),
        prefer_typed,
        "member sources"
    );

    let mut items = explicit;
    if !prefer_typed {
        items.extend(introspected);
    }
    items.extend(typed);
    sort_and_dedup(&mut items);
    items
}

/// Metadata roots plus the top-level keys of the value tree.
pub(super) fn root_items(ctx: &ExpressionContext, sources: &Sources<'_>) -> Vec<SuggestionItem> {
    let mut items = metadata_items(sources.metadata, "", &ctx.segment_prefix);
    if let Some(tree) = sources.values {
        items.extend(introspected_items(ctx, tree));
    }
    sort_and_dedup(&mut items);
    items
}

/// The single pseudo-item shown for `callee(`.
pub(super) fn signature_item(ctx: &ExpressionContext, sources: &Sources<'_>) -> SuggestionItem {
    let name = ctx.segment_prefix.as_str();
    let owner = ctx.base_path.as_str();
    let call_path = ctx.call_path.clone().unwrap_or_else(|| ctx.full_path(name));

    let declared = if owner.is_empty() {
        None
    } else {
        let owner_value = resolve_value(owner, sources);
        path_types(owner, owner_value, sources)
            .iter()
            .find_map(|ty| sources.index.doc(ty, name))
    };
    let explicit = sources.metadata.get(&call_path);

    let detail = declared
        .and_then(|doc| doc.detail.clone())
        .or_else(|| explicit.and_then(|entry| entry.detail.clone()));
    let documentation = declared
        .and_then(|doc| doc.documentation.clone())
        .or_else(|| explicit.and_then(|entry| entry.documentation.clone()));

    SuggestionItem::new(name, call_path)
        .with_kind(Some(CompletionKind::Signature))
        .with_detail(detail)
        .with_documentation(documentation)
}

fn metadata_items(metadata: &Metadata, base: &str, prefix: &str) -> Vec<SuggestionItem> {
    metadata
        .children_of(base)
        .into_iter()
        .filter(|child| child.segment.starts_with(prefix))
        .map(metadata_item)
        .collect()
}

fn metadata_item(child: MetadataChild<'_>) -> SuggestionItem {
    let append_dot = child.entry.map_or(child.has_children, |entry| entry.append_dot);
    let item = SuggestionItem::new(child.segment, child.full_path).with_append_dot(append_dot);
    match child.entry {
        Some(entry) => item
            .with_kind(entry.kind.as_deref().map(CompletionKind::from_name))
            .with_detail(entry.detail.clone())
            .with_documentation(entry.documentation.clone()),
        None => item,
    }
}

fn introspected_items(ctx: &ExpressionContext, value: &Value) -> Vec<SuggestionItem> {
    value
        .own_keys()
        .into_iter()
        .filter(|key| key.starts_with(ctx.segment_prefix.as_str()))
        .map(|key| {
            let child = value.get(key);
            let kind = if child.is_some_and(Value::is_function) {
                CompletionKind::Function
            } else {
                CompletionKind::Property
            };
            let append_dot =
                child.is_some_and(|child| matches!(child, Value::Object(_)) && child.has_members());
            SuggestionItem::new(key, ctx.full_path(key))
                .with_kind(Some(kind))
                .with_append_dot(append_dot)
        })
        .collect()
}

fn typed_items(
    ctx: &ExpressionContext,
    type_names: &[String],
    index: &DeclarationIndex,
) -> Vec<SuggestionItem> {
    let prefix = ctx.segment_prefix.as_str();
    let mut items = Vec::new();
    for ty in type_names {
        let Some(members) = index.members_of(ty) else {
            continue;
        };
        for member in members.iter().filter(|m| m.starts_with(prefix)) {
            let doc = index.doc(ty, member);
            let detail = doc.and_then(|doc| doc.detail.clone());
            let kind = match index.namespace_member_kind(ty, member) {
                Some(kind) => CompletionKind::from(kind),
                None if is_method_detail(member, detail.as_deref()) => CompletionKind::Method,
                None => CompletionKind::Property,
            };
            items.push(
                SuggestionItem::new(member.as_str(), ctx.full_path(member))
                    .with_kind(Some(kind))
                    .with_detail(detail)
                    .with_documentation(doc.and_then(|doc| doc.documentation.clone()))
                    .with_append_dot(index.is_namespace(&format!("{ty}.{member}"))),
            );
        }
    }
    items
}

fn is_method_detail(member: &str, detail: Option<&str>) -> bool {
    detail
        .and_then(|detail| detail.strip_prefix(member))
        .map(|rest| rest.trim_start_matches('?'))
        .is_some_and(|rest| rest.starts_with('(') || rest.starts_with('<'))
}
