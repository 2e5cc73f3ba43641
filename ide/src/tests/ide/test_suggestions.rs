use analyzer::{MetadataEntry, Value};

use crate::{CompletionKind, SuggestionSource};
use crate::tests::ide::completion_dsl::{fixture, t};

const MATH: &str = r#"
declare var Math: Math;
interface Math {
    /** Returns the larger of a set of supplied numeric expressions. */
    max(...values: number[]): number;
    readonly PI: number;
}
"#;

#[test]
fn member_access_on_plain_object_lists_own_keys_in_order() {
    t("{{ a.$0")
        .fixture(fixture().values(r#"{ "a": { "b": 1, "c": 2 } }"#))
        .expect_labels(&["b", "c"]);
}

#[test]
fn typed_segment_filters_by_prefix() {
    t("{{ user.na$0 }}")
        .fixture(fixture().values(r#"{ "user": { "name": "Ada", "nick": "a", "age": 36 } }"#))
        .expect_labels(&["name"]);
}

#[test]
fn explicit_metadata_suppresses_introspection() {
    t("{{ user.$0")
        .fixture(
            fixture()
                .values(r#"{ "user": { "name": "Ada", "age": 36 } }"#)
                .meta_detail("user.name", "property", "string"),
        )
        .expect_labels(&["name"])
        .expect_item("name", |item| {
            assert_eq!(item.detail.as_deref(), Some("string"));
            assert_eq!(item.full_path, "user.name");
            assert_eq!(item.source, SuggestionSource::Context);
        });
}

#[test]
fn root_lists_metadata_roots_and_value_tree_keys() {
    t("{{ $0")
        .fixture(
            fixture()
                .meta("form.submit", MetadataEntry::default())
                .values(r#"{ "user": { "name": "Ada" }, "count": 3 }"#),
        )
        .expect_labels(&["count", "form", "user"])
        .expect_item("form", |item| {
            assert!(item.append_dot);
            assert_eq!(item.insert_text, "form.");
        })
        .expect_item("user", |item| assert_eq!(item.insert_text, "user."))
        .expect_item("count", |item| {
            assert!(!item.append_dot);
            assert_eq!(item.insert_text, "count");
        });
}

#[test]
fn explicit_append_dot_overrides_children() {
    t("{{ $0")
        .fixture(
            fixture()
                .meta("form", MetadataEntry::default())
                .meta("form.submit", MetadataEntry::default()),
        )
        .expect_item("form", |item| assert!(!item.append_dot));
}

#[test]
fn declared_members_are_preferred_over_introspected_ones() {
    t("{{ Math.$0")
        .fixture(fixture().well_known_globals().declarations(MATH))
        .expect_labels(&["PI", "max"])
        .expect_item("max", |item| {
            assert_eq!(item.kind, Some(CompletionKind::Method));
            assert_eq!(item.detail.as_deref(), Some("max(...values: number[]): number"));
            assert_eq!(
                item.documentation.as_deref(),
                Some("Returns the larger of a set of supplied numeric expressions.")
            );
        })
        .expect_item("PI", |item| assert_eq!(item.kind, Some(CompletionKind::Property)));
}

#[test]
fn function_only_types_union_with_introspected_statics() {
    t("{{ Date.$0")
        .fixture(
            fixture()
                .well_known_globals()
                .declarations("interface Function { apply(this: Function, args?: any): any; }"),
        )
        .expect_labels(&["UTC", "apply", "now", "parse"]);
}

#[test]
fn overlapping_sources_never_duplicate_labels() {
    let callable = Value::function_with("f", [("call", Value::function("call"))]);
    t("{{ f.$0")
        .fixture(
            fixture()
                .value(Value::object([("f", callable)]))
                .declarations("interface Function { call(): any; apply(): any; }"),
        )
        .expect_labels(&["apply", "call"])
        .expect_no_duplicate_labels()
        .expect_item("call", |item| {
            assert_eq!(item.kind, Some(CompletionKind::Function));
            assert_eq!(item.detail.as_deref(), Some("call(): any"));
        });
}

#[test]
fn class_instances_use_their_declared_interface() {
    let point = Value::instance("Point", [("x", Value::Number(1.0)), ("y", Value::Number(2.0))]);
    t("{{ p.$0")
        .fixture(
            fixture()
                .value(Value::object([("p", point)]))
                .declarations("interface Point { x: number; y: number; norm(): number; }"),
        )
        .expect_labels(&["norm", "x", "y"]);
}

#[test]
fn literal_receivers_use_pseudo_types() {
    let strings = "interface String { toUpperCase(): string; readonly length: number; }";
    t(r#"{{ "abc".to$0"#)
        .fixture(fixture().declarations(strings))
        .expect_labels(&["toUpperCase"]);
    t("{{ null.$0")
        .fixture(fixture().declarations(strings))
        .expect_labels(&[]);
}

#[test]
fn call_results_use_documented_return_types() {
    t("{{ doc.getTitle().$0")
        .fixture(fixture().declarations(
            r#"
declare var doc: Doc;
interface Doc { getTitle(): string; }
interface String { trim(): string; }
"#,
        ))
        .expect_labels(&["trim"]);
}

#[test]
fn nested_properties_follow_declared_property_types() {
    t("{{ win.document.$0")
        .fixture(fixture().declarations(
            r#"
declare var win: Window;
interface Window { readonly document: Document; }
interface Document { title: string; }
"#,
        ))
        .expect_labels(&["title"]);
}

#[test]
fn namespace_members_carry_kinds_and_nested_namespaces_append_dot() {
    t("{{ utils.$0")
        .fixture(fixture().declarations(
            r#"
declare namespace utils {
    function formatDate(date: Date): string;
    var settings: object;
    namespace strings {
        function pad(value: string): string;
    }
}
"#,
        ))
        .expect_labels(&["formatDate", "settings", "strings"])
        .expect_item("formatDate", |item| {
            assert_eq!(item.kind, Some(CompletionKind::Function))
        })
        .expect_item("settings", |item| assert_eq!(item.kind, Some(CompletionKind::Object)))
        .expect_item("strings", |item| {
            assert!(item.append_dot);
            assert_eq!(item.insert_text, "strings.");
        });
}

#[test]
fn missing_values_fall_back_to_nothing() {
    t("{{ nowhere.$0")
        .fixture(fixture().values(r#"{ "a": 1 }"#))
        .expect_labels(&[]);
    t("{{ (a + b).$0").expect_labels(&[]);
}

#[test]
fn reflective_properties_are_never_suggested() {
    let f = Value::function_with(
        "f",
        [("caller", Value::Null), ("length", Value::Number(1.0))],
    );
    t("{{ f.$0")
        .fixture(fixture().value(Value::object([("f", f)])))
        .expect_contains(&["length"])
        .expect_not_contains(&["caller"]);
}

#[test]
fn empty_call_yields_a_single_signature_item() {
    t("{{ foo($0")
        .fixture(fixture().meta_detail("foo", "function", "foo(x: number): number"))
        .expect_labels(&["foo"])
        .expect_item("foo", |item| {
            assert!(item.is_signature());
            assert_eq!(item.full_path, "foo");
            assert_eq!(item.detail.as_deref(), Some("foo(x: number): number"));
        });

    t("{{ Math.max( $0")
        .fixture(fixture().well_known_globals().declarations(MATH))
        .expect_labels(&["max"])
        .expect_item("max", |item| {
            assert_eq!(item.detail.as_deref(), Some("max(...values: number[]): number"));
        });
}

#[test]
fn host_kinds_pass_through_and_cannot_claim_signature() {
    t("{{ form.$0")
        .fixture(
            fixture()
                .meta_detail("form.submit", "event", "submit(): void")
                .meta_detail("form.preview", "signature", "preview(): void"),
        )
        .expect_labels(&["preview", "submit"])
        .expect_item("submit", |item| {
            assert_eq!(item.kind, Some(CompletionKind::Other("event".to_string())));
            let json = serde_json::to_value(item).unwrap();
            assert_eq!(json["kind"], "event");
        })
        .expect_item("preview", |item| assert!(!item.is_signature()));
}
