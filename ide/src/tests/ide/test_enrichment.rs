use futures::executor::block_on;

use crate::tests::ide::completion_dsl::{Fixture, URI, fixture, session};
use crate::{Key, PopupPhase, SuggestionSource, WorkerError};

fn object_fixture() -> Fixture {
    fixture().values(r#"{ "a": { "bar": 1, "baz": 2 } }"#)
}

#[test]
fn member_access_queries_the_worker_at_the_cursor() {
    let mut s = session("{{ a.$0", object_fixture());
    let pending = s.refresh().expect("member access should query the worker");
    assert_eq!(*s.service.queries.borrow(), vec![(URI.to_string(), 5)]);

    let response = block_on(pending.resolve());
    assert_eq!(response.source.offset, 5);
    assert!(s.popup.apply_enrichment(response));
}

#[test]
fn root_context_does_not_query_the_worker() {
    let mut s = session("{{ $0", object_fixture());
    assert!(s.refresh().is_none());
    assert_eq!(s.phase(), PopupPhase::Open);
    assert!(s.service.queries.borrow().is_empty());
}

#[test]
fn worker_items_patch_existing_and_append_new_labels() {
    let mut s = session("{{ a.$0", object_fixture());
    s.service.answer(&["baz", "qux"]);
    let pending = s.refresh().unwrap();

    assert!(s.popup.apply_enrichment(block_on(pending.resolve())));
    assert_eq!(s.labels(), vec!["bar", "baz", "qux"]);

    let items = &s.popup.state().items;
    assert_eq!(items[1].source, SuggestionSource::Context);
    assert_eq!(
        items[1].completion_data.as_ref().map(|d| d.name.as_str()),
        Some("baz")
    );
    assert_eq!(items[2].source, SuggestionSource::Js);
    assert_eq!(items[2].full_path, "a.qux");
    assert!(items[0].completion_source.is_none());
}

#[test]
fn stale_response_never_changes_state() {
    let mut s = session("{{ a.$0", object_fixture());
    s.service.answer(&["stale"]);
    let first = s.refresh().unwrap();

    s.service.answer(&["fresh"]);
    s.buffer.type_text("b");
    let second = s.type_text("").unwrap();
    assert!(first.request_id() < second.request_id());

    let before = s.popup.state().clone();
    assert!(!s.popup.apply_enrichment(block_on(first.resolve())));
    assert_eq!(*s.popup.state(), before);

    // `fresh` does not match the typed `b`, so only the sync list remains.
    assert!(s.popup.apply_enrichment(block_on(second.resolve())));
    assert_eq!(s.labels(), vec!["bar", "baz"]);
}

#[test]
fn response_after_close_is_discarded() {
    let mut s = session("{{ a.$0", object_fixture());
    s.service.answer(&["late"]);
    let pending = s.refresh().unwrap();
    s.key(Key::Escape);

    assert!(!s.popup.apply_enrichment(block_on(pending.resolve())));
    assert_eq!(s.phase(), PopupPhase::Closed);
    assert!(s.popup.state().items.is_empty());
}

#[test]
fn worker_failure_keeps_synchronous_items() {
    let mut s = session("{{ a.$0", object_fixture());
    s.service.fail(WorkerError::Disconnected);
    let pending = s.refresh().unwrap();

    let before = s.popup.state().clone();
    assert!(!s.popup.apply_enrichment(block_on(pending.resolve())));
    assert_eq!(*s.popup.state(), before);
}

#[test]
fn merge_keeps_the_active_item_selected_by_label() {
    let mut s = session("{{ a.$0", object_fixture());
    s.service.answer(&["aaa"]);
    let pending = s.refresh().unwrap();
    s.key(Key::ArrowDown);
    assert_eq!(s.active_label(), Some("baz"));

    assert!(s.popup.apply_enrichment(block_on(pending.resolve())));
    assert_eq!(s.labels(), vec!["aaa", "bar", "baz"]);
    assert_eq!(s.active_label(), Some("baz"));
}

#[test]
fn recompute_resets_selection() {
    let mut s = session("{{ a.$0", object_fixture());
    s.refresh();
    s.key(Key::ArrowDown);
    s.type_text("b");
    assert_eq!(s.popup.state().active_index, 0);
}
