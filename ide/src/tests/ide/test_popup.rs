use crate::tests::ide::completion_dsl::{fixture, session};
use crate::{CompletionConfig, CursorCoords, Editor, Key, PopupPhase, TextBuffer};

fn object_fixture() -> crate::tests::ide::completion_dsl::Fixture {
    fixture().values(r#"{ "a": { "bar": 1, "baz": 2 }, "user": { "name": "Ada" } }"#)
}

#[test]
fn opens_on_member_access_and_closes_on_escape() {
    let mut s = session("{{ a.$0", object_fixture());
    s.refresh();
    assert_eq!(s.phase(), PopupPhase::Open);
    assert_eq!(s.labels(), vec!["bar", "baz"]);
    assert_eq!(s.popup.state().active_index, 0);

    let outcome = s.key(Key::Escape);
    assert!(outcome.handled);
    assert_eq!(s.phase(), PopupPhase::Closed);
    assert!(s.popup.state().items.is_empty());
}

#[test]
fn empty_call_opens_signature_and_ignores_navigation() {
    let mut s = session(
        "{{ foo($0",
        fixture().meta_detail("foo", "function", "foo(x: number): number"),
    );
    s.refresh();
    assert_eq!(s.phase(), PopupPhase::OpenSignature);
    assert_eq!(s.labels(), vec!["foo"]);
    assert!(s.popup.state().signature_only);
    assert_eq!(s.popup.state().replace_range, None);

    for key in [Key::ArrowDown, Key::ArrowUp, Key::Enter, Key::Tab] {
        assert!(!s.key(key).handled);
        assert_eq!(s.phase(), PopupPhase::OpenSignature);
    }
    assert_eq!(s.buffer.text(), "{{ foo(");

    assert!(s.key(Key::Escape).handled);
    assert_eq!(s.phase(), PopupPhase::Closed);
}

#[test]
fn empty_call_opens_signature_even_without_documentation() {
    let mut s = session("{{ bar($0", fixture());
    s.refresh();
    assert_eq!(s.phase(), PopupPhase::OpenSignature);
    assert_eq!(s.labels(), vec!["bar"]);
}

#[test]
fn arrows_wrap_around() {
    let mut s = session("{{ a.$0", object_fixture());
    s.refresh();

    s.key(Key::ArrowUp);
    assert_eq!(s.active_label(), Some("baz"));
    s.key(Key::ArrowDown);
    assert_eq!(s.active_label(), Some("bar"));
    s.key(Key::ArrowDown);
    s.key(Key::ArrowDown);
    assert_eq!(s.active_label(), Some("bar"));
}

#[test]
fn commit_replaces_typed_segment_and_moves_cursor() {
    let mut s = session("{{ a.ba$0 }}", object_fixture()).track_commits();
    s.refresh();
    assert_eq!(s.popup.state().replace_range.map(|r| (r.start, r.end)), Some((5, 7)));

    s.key(Key::ArrowDown);
    let outcome = s.key(Key::Enter);

    assert!(outcome.handled);
    assert!(outcome.enrichment.is_none());
    assert_eq!(s.buffer.text(), "{{ a.baz }}");
    assert_eq!(s.buffer.cursor(), 5 + "baz".len() as u32);
    assert_eq!(s.phase(), PopupPhase::Closed);
    assert_eq!(*s.committed.borrow(), vec!["baz".to_string()]);
}

#[test]
fn committing_an_object_retriggers_on_the_dotted_path() {
    let mut s = session("{{ us$0", object_fixture());
    s.refresh();
    assert_eq!(s.labels(), vec!["user"]);

    let outcome = s.key(Key::Tab);
    assert!(outcome.handled);
    assert_eq!(s.buffer.text(), "{{ user.");
    assert_eq!(s.buffer.cursor(), 8);
    assert_eq!(s.phase(), PopupPhase::Open);
    assert_eq!(s.labels(), vec!["name"]);
    // The re-trigger is a member access, so it queries the worker.
    assert!(outcome.enrichment.is_some());
}

#[test]
fn leaving_the_expression_closes() {
    let mut s = session("{{ a.$0", object_fixture());
    s.refresh();
    assert_eq!(s.phase(), PopupPhase::Open);

    s.type_text("bar }} ");
    assert_eq!(s.phase(), PopupPhase::Closed);
    assert!(s.popup.context().is_none());
}

#[test]
fn no_synchronous_items_keeps_popup_closed() {
    let mut s = session("{{ a.zz$0", object_fixture());
    assert!(s.refresh().is_none());
    assert_eq!(s.phase(), PopupPhase::Closed);
}

#[test]
fn blur_and_cancel_close() {
    let mut s = session("{{ a.$0", object_fixture());
    s.refresh();
    s.popup.blur();
    assert_eq!(s.phase(), PopupPhase::Closed);

    s.refresh();
    assert_eq!(s.phase(), PopupPhase::Open);
    s.popup.cancel();
    assert_eq!(s.phase(), PopupPhase::Closed);
}

#[test]
fn keys_are_ignored_while_closed() {
    let mut s = session("plain $0text", object_fixture());
    s.refresh();
    assert_eq!(s.phase(), PopupPhase::Closed);
    assert!(!s.key(Key::Enter).handled);
    assert!(!s.key(Key::Escape).handled);
}

#[test]
fn anchor_sits_below_the_cursor() {
    let mut s = session("{{ a.$0", object_fixture());
    s.buffer = TextBuffer::new(s.buffer.buffer_uri(), s.buffer.text(), s.buffer.cursor())
        .with_coords(CursorCoords {
            top: 10.0,
            left: 42.0,
            bottom: 28.0,
        });
    s.refresh();
    let anchor = s.popup.state().anchor;
    assert_eq!((anchor.top, anchor.left), (28.0, 42.0));
}

#[test]
fn custom_markers() {
    let config = CompletionConfig {
        markers: analyzer::MarkerPair {
            open: "${".to_string(),
            close: "}".to_string(),
        },
        enrichment: false,
    };
    let mut s = session("${ a.b$0", object_fixture()).config(config);
    assert!(s.refresh().is_none());
    assert_eq!(s.labels(), vec!["bar", "baz"]);
    assert!(s.service.queries.borrow().is_empty());
}

#[test]
fn dom_key_names_map_to_keys() {
    assert_eq!(Key::from_dom("ArrowDown"), Key::ArrowDown);
    assert_eq!(Key::from_dom("Esc"), Key::Escape);
    assert_eq!(Key::from_dom("a"), Key::Other);
}
