use std::cell::RefCell;
use std::rc::Rc;

use analyzer::{DeclarationIndex, Globals, Metadata, MetadataEntry, Value, extract_context};
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::tests::init_tracing;
use crate::{
    CompletionConfig, Editor, Key, KeyOutcome, LanguageService, PendingEnrichment, Popup,
    PopupPhase, Sources, SuggestionItem, TextBuffer, WorkerCompletion, WorkerError,
    compute_suggestions,
};

pub const URI: &str = "file:///page.html";

// ----------------------------
// Sources
// ----------------------------

#[derive(Debug, Clone, Default)]
pub struct Fixture {
    metadata: Metadata,
    values: Option<Value>,
    globals: Globals,
    index: DeclarationIndex,
}

pub fn fixture() -> Fixture {
    Fixture::default()
}

impl Fixture {
    pub fn values(mut self, json: &str) -> Self {
        self.values = Some(serde_json::from_str(json).expect("fixture values must be JSON"));
        self
    }

    pub fn value(mut self, values: Value) -> Self {
        self.values = Some(values);
        self
    }

    pub fn meta(mut self, path: &str, entry: MetadataEntry) -> Self {
        self.metadata.insert(path, entry);
        self
    }

    pub fn meta_detail(self, path: &str, kind: &str, detail: &str) -> Self {
        self.meta(
            path,
            MetadataEntry {
                kind: Some(kind.to_string()),
                detail: Some(detail.to_string()),
                ..MetadataEntry::default()
            },
        )
    }

    pub fn declarations(mut self, text: &str) -> Self {
        self.index
            .ingest(text)
            .expect("fixture declarations must parse");
        self
    }

    pub fn well_known_globals(mut self) -> Self {
        self.globals = Globals::well_known();
        self
    }

    pub fn sources(&self) -> Sources<'_> {
        Sources {
            metadata: &self.metadata,
            values: self.values.as_ref(),
            globals: &self.globals,
            index: &self.index,
        }
    }
}

/// Splits a `$0` fixture into text and byte cursor.
pub fn split_cursor(input_with_cursor: &str) -> (String, u32) {
    let cursor = input_with_cursor
        .find("$0")
        .expect("fixture must contain $0 marker");
    let text = input_with_cursor.replace("$0", "");
    assert!(
        text.len() + 2 == input_with_cursor.len(),
        "fixture must contain exactly one $0 marker"
    );
    (text, cursor as u32)
}

// ----------------------------
// Suggestion Test DSL
// ----------------------------

pub fn t(input_with_cursor: &str) -> SuggestTestBuilder {
    SuggestTestBuilder::new(input_with_cursor)
}

pub struct SuggestTestBuilder {
    buffer: TextBuffer,
    fixture: Fixture,
    output: Option<Vec<SuggestionItem>>,
}

impl SuggestTestBuilder {
    fn new(input_with_cursor: &str) -> Self {
        let (text, cursor) = split_cursor(input_with_cursor);
        Self {
            buffer: TextBuffer::new(URI, text, cursor),
            fixture: Fixture::default(),
            output: None,
        }
    }

    pub fn fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = fixture;
        self.output = None;
        self
    }

    fn ensure_run(&mut self) -> &[SuggestionItem] {
        if self.output.is_none() {
            let line = self.buffer.text_before_cursor();
            let ctx = extract_context(&line, &CompletionConfig::default().markers)
                .expect("fixture cursor must be inside an expression");
            self.output = Some(compute_suggestions(&ctx, &self.fixture.sources()));
        }
        self.output.as_deref().unwrap_or_default()
    }

    fn labels(&mut self) -> Vec<String> {
        self.ensure_run()
            .iter()
            .map(|item| item.label.clone())
            .collect()
    }

    pub fn expect_labels(mut self, expected: &[&str]) -> Self {
        let labels = self.labels();
        assert_eq!(labels, expected, "unexpected suggestion labels");
        self
    }

    pub fn expect_contains(mut self, expected: &[&str]) -> Self {
        let labels = self.labels();
        for label in expected {
            assert!(
                labels.iter().any(|l| l == label),
                "expected `{label}` in {labels:?}"
            );
        }
        self
    }

    pub fn expect_not_contains(mut self, unexpected: &[&str]) -> Self {
        let labels = self.labels();
        for label in unexpected {
            assert!(
                !labels.iter().any(|l| l == label),
                "did not expect `{label}` in {labels:?}"
            );
        }
        self
    }

    pub fn expect_no_duplicate_labels(mut self) -> Self {
        let labels = self.labels();
        let mut deduped = labels.clone();
        deduped.dedup();
        assert_eq!(labels, deduped, "labels must be unique");
        self
    }

    /// Runs `check` against the item labelled `label`.
    pub fn expect_item(mut self, label: &str, check: impl FnOnce(&SuggestionItem)) -> Self {
        let items = self.ensure_run();
        let item = items
            .iter()
            .find(|item| item.label == label)
            .unwrap_or_else(|| panic!("no item labelled `{label}`"));
        check(item);
        self
    }
}

// ----------------------------
// Popup Session
// ----------------------------

/// Language service double with canned answers, recording every query.
pub struct FakeService {
    answer: RefCell<Result<Vec<WorkerCompletion>, WorkerError>>,
    pub queries: RefCell<Vec<(String, u32)>>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            answer: RefCell::new(Ok(Vec::new())),
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl FakeService {
    pub fn answer(&self, names: &[&str]) {
        *self.answer.borrow_mut() = Ok(names.iter().map(|name| worker_item(name)).collect());
    }

    pub fn fail(&self, err: WorkerError) {
        *self.answer.borrow_mut() = Err(err);
    }
}

impl LanguageService for FakeService {
    fn completions(
        &self,
        buffer_uri: &str,
        offset: u32,
    ) -> LocalBoxFuture<'static, Result<Vec<WorkerCompletion>, WorkerError>> {
        self.queries
            .borrow_mut()
            .push((buffer_uri.to_string(), offset));
        futures::future::ready(self.answer.borrow().clone()).boxed_local()
    }
}

pub fn worker_item(name: &str) -> WorkerCompletion {
    WorkerCompletion {
        name: name.to_string(),
        insert_text: None,
        kind: "property".to_string(),
    }
}

pub fn session(input_with_cursor: &str, fixture: Fixture) -> Session {
    init_tracing();
    let (text, cursor) = split_cursor(input_with_cursor);
    Session {
        buffer: TextBuffer::new(URI, text, cursor),
        popup: Popup::default(),
        fixture,
        service: FakeService::default(),
        committed: Rc::new(RefCell::new(Vec::new())),
    }
}

pub struct Session {
    pub buffer: TextBuffer,
    pub popup: Popup,
    pub fixture: Fixture,
    pub service: FakeService,
    pub committed: Rc<RefCell<Vec<String>>>,
}

impl Session {
    pub fn config(mut self, config: CompletionConfig) -> Self {
        self.popup = Popup::new(config);
        self
    }

    /// Records committed labels in `committed`.
    pub fn track_commits(mut self) -> Self {
        let committed = Rc::clone(&self.committed);
        self.popup
            .on_commit(move |item| committed.borrow_mut().push(item.label.clone()));
        self
    }

    pub fn refresh(&mut self) -> Option<PendingEnrichment> {
        let sources = self.fixture.sources();
        self.popup
            .refresh(&self.buffer, &sources, Some(&self.service))
    }

    pub fn key(&mut self, key: Key) -> KeyOutcome {
        let sources = self.fixture.sources();
        self.popup
            .handle_key(key, &mut self.buffer, &sources, Some(&self.service))
    }

    pub fn type_text(&mut self, text: &str) -> Option<PendingEnrichment> {
        self.buffer.type_text(text);
        self.refresh()
    }

    pub fn phase(&self) -> PopupPhase {
        self.popup.phase()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.popup
            .state()
            .items
            .iter()
            .map(|item| item.label.as_str())
            .collect()
    }

    pub fn active_label(&self) -> Option<&str> {
        self.popup
            .state()
            .active_item()
            .map(|item| item.label.as_str())
    }
}
