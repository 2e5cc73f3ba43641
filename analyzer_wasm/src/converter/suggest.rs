use analyzer::{DeclarationIndex, Globals, Span as ByteSpan, Value, extract_context};
use ide::{Sources, compute_suggestions};

use crate::converter::Converter;
use crate::dto::v1::{
    ExpressionContext, SuggestInput, SuggestResult, SuggestionItem, SuggestionSource,
};
use crate::offsets::byte_span_to_utf16;

impl Converter {
    /// Runs the synchronous suggestion query for one editor line.
    pub fn suggest(input: SuggestInput, index: &DeclarationIndex, globals: &Globals) -> SuggestResult {
        let line = input.line.as_str();
        let cursor = Self::cursor_utf16_to_byte(line, input.cursor as usize);
        let Some(ctx) = extract_context(&line[..cursor], &input.config.markers) else {
            return SuggestResult {
                context: None,
                items: Vec::new(),
                replace: None,
                signature_only: false,
            };
        };

        let values = input.values.map(Value::from);
        let sources = Sources {
            metadata: &input.metadata,
            values: values.as_ref(),
            globals,
            index,
        };
        let items = compute_suggestions(&ctx, &sources)
            .iter()
            .map(suggestion_item_view)
            .collect();

        let replace = (!ctx.is_empty_call).then(|| {
            let start = cursor - ctx.segment_prefix.len();
            byte_span_to_utf16(line, ByteSpan::new(start as u32, cursor as u32))
        });

        SuggestResult {
            context: Some(context_view(&ctx)),
            items,
            replace,
            signature_only: ctx.is_empty_call,
        }
    }
}

fn context_view(ctx: &analyzer::ExpressionContext) -> ExpressionContext {
    ExpressionContext {
        raw_prefix: ctx.raw_prefix.clone(),
        has_dot: ctx.has_dot,
        base_path: ctx.base_path.clone(),
        segment_prefix: ctx.segment_prefix.clone(),
        is_empty_call: ctx.is_empty_call,
        call_path: ctx.call_path.clone(),
    }
}

fn suggestion_item_view(item: &ide::SuggestionItem) -> SuggestionItem {
    SuggestionItem {
        label: item.label.clone(),
        insert_text: item.insert_text.clone(),
        kind: item.kind.as_ref().map(|kind| kind.as_str().to_string()),
        detail: item.detail.clone(),
        documentation: item.documentation.clone(),
        full_path: item.full_path.clone(),
        append_dot: item.append_dot,
        source: match item.source {
            ide::SuggestionSource::Context => SuggestionSource::Context,
            ide::SuggestionSource::Js => SuggestionSource::Js,
        },
    }
}
