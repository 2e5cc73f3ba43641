//! Core analysis for embedded-expression completion.
//!
//! Pipeline: extract context → (index declarations, resolve values) → `ide` ranks and
//! presents suggestions.
//! All spans are UTF-8 byte offsets, using `[start, end)`.
//! UTF-16 conversion for editors happens in `analyzer_wasm`.

pub mod context;
pub mod declarations;
pub mod metadata;
mod span;
mod text_edit;
pub mod value;

pub use context::{ExpressionContext, LiteralKind, MarkerPair, Receiver, extract_context};
pub use declarations::{
    DeclarationError, DeclarationFile, DeclarationIndex, DeclarationLoader, DeclarationStore,
    LoadError, LoadReport, MemberDoc, MemberKind, parse_declarations,
};
pub use metadata::{Metadata, MetadataEntry};
pub use span::Span;
pub use text_edit::TextEdit;
pub use value::{Globals, Value};
