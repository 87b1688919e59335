use serde_json::{json, Value};

use normalizer::selection::{LinkedField, ScalarField, Selection};
use normalizer::{
    normalize, CollectingSink, NormalizationOptions, NormalizeWarning, PayloadObject, Record,
    RecordSource, RecordValue, Selector, Variables, ROOT_ID,
};

fn root_source() -> RecordSource {
    let mut source = RecordSource::new();
    source.set(ROOT_ID.into(), Record::new(ROOT_ID.into(), "Query".into()));
    source
}

fn scalar(name: &str) -> Selection {
    Selection::ScalarField(ScalarField {
        name: name.into(),
        alias: None,
        args: Vec::new(),
    })
}

fn linked(name: &str, concrete_type: &str, selections: Vec<Selection>) -> Selection {
    Selection::LinkedField(LinkedField {
        name: name.into(),
        alias: None,
        concrete_type: Some(concrete_type.into()),
        plural: false,
        args: Vec::new(),
        selections,
    })
}

fn id_resolver(object: &PayloadObject, _type_name: &str) -> Option<Value> {
    object.get("id").cloned()
}

fn run_with_resolver(
    source: &mut RecordSource,
    selections: &[Selection],
    payload: Value,
    sink: &mut CollectingSink,
) {
    let variables = Variables::new();
    normalize(
        source,
        Selector {
            data_id: ROOT_ID.into(),
            selections,
            variables: &variables,
        },
        &payload,
        NormalizationOptions {
            identity_resolver: Some(&id_resolver),
            ..NormalizationOptions::default()
        },
        sink,
    )
    .expect("normalization should succeed");
}

#[test]
fn duplicate_identity_with_conflicting_types_warns_once_and_overwrites() {
    let mut source = root_source();
    // Two distinct objects resolve to the same id with different types.
    let selections = vec![
        linked("a", "User", vec![scalar("name")]),
        linked("b", "Page", vec![scalar("name")]),
    ];
    let mut sink = CollectingSink::new();
    run_with_resolver(
        &mut source,
        &selections,
        json!({
            "a": { "id": "1", "name": "first" },
            "b": { "id": "1", "name": "second" },
        }),
        &mut sink,
    );

    let mismatches: Vec<_> = sink
        .warnings
        .iter()
        .filter(|warning| matches!(warning, NormalizeWarning::TypeMismatch { .. }))
        .collect();
    assert_eq!(mismatches.len(), 1);

    // Last write wins; the call never fails.
    let record = source.get("1").unwrap();
    assert_eq!(record.typename(), "User");
    assert_eq!(record.value("name"), Some(&RecordValue::Scalar(json!("second"))));
}

#[test]
fn conflicting_scalar_values_for_one_key_are_reported() {
    let mut source = root_source();
    let selections = vec![
        linked("a", "User", vec![scalar("name")]),
        linked("b", "User", vec![scalar("name")]),
    ];
    let mut sink = CollectingSink::new();
    run_with_resolver(
        &mut source,
        &selections,
        json!({
            "a": { "id": "1", "name": "first" },
            "b": { "id": "1", "name": "second" },
        }),
        &mut sink,
    );

    assert!(sink.warnings.iter().any(|warning| matches!(
        warning,
        NormalizeWarning::ConflictingScalar { data_id, storage_key, .. }
            if data_id == "1" && storage_key == "name"
    )));
}

#[test]
fn identical_repeated_values_do_not_warn() {
    let mut source = root_source();
    let selections = vec![
        linked("a", "User", vec![scalar("name")]),
        linked("b", "User", vec![scalar("name")]),
    ];
    let mut sink = CollectingSink::new();
    run_with_resolver(
        &mut source,
        &selections,
        json!({
            "a": { "id": "1", "name": "same" },
            "b": { "id": "1", "name": "same" },
        }),
        &mut sink,
    );
    assert!(sink.is_empty());
}

#[test]
fn relinking_a_slot_to_a_different_identity_is_reported() {
    let mut source = root_source();
    let selections = vec![linked("viewer", "User", vec![scalar("name")])];
    let mut sink = CollectingSink::new();
    run_with_resolver(
        &mut source,
        &selections,
        json!({ "viewer": { "id": "1", "name": "x" } }),
        &mut sink,
    );
    run_with_resolver(
        &mut source,
        &selections,
        json!({ "viewer": { "id": "2", "name": "y" } }),
        &mut sink,
    );

    assert!(sink.warnings.iter().any(|warning| matches!(
        warning,
        NormalizeWarning::ConflictingLink { previous_id, next_id, .. }
            if previous_id == "1" && next_id == "2"
    )));
    // The overwrite still happens.
    assert_eq!(
        source.get(ROOT_ID).unwrap().linked_id("viewer").map(String::as_str),
        Some("2")
    );
}

#[test]
fn type_checks_are_suppressed_for_client_generated_records() {
    // Same position, no server identity, different concrete types across
    // two passes: the reused client record keeps its original type quietly.
    let mut source = root_source();
    let first = vec![linked("viewer", "User", vec![scalar("name")])];
    let second = vec![linked("viewer", "Page", vec![scalar("name")])];
    let variables = Variables::new();
    let mut sink = CollectingSink::new();
    for selections in [&first, &second] {
        normalize(
            &mut source,
            Selector {
                data_id: ROOT_ID.into(),
                selections,
                variables: &variables,
            },
            &json!({ "viewer": { "name": "Alice" } }),
            NormalizationOptions::default(),
            &mut sink,
        )
        .unwrap();
    }

    assert!(!sink
        .warnings
        .iter()
        .any(|warning| matches!(warning, NormalizeWarning::TypeMismatch { .. })));
    assert_eq!(
        source.get("client:client:root:viewer").unwrap().typename(),
        "User"
    );
}

#[test]
fn the_root_record_is_never_exempt_from_type_checks() {
    let mut source = root_source();
    let selections = vec![linked("self", "User", vec![scalar("name")])];
    let mut sink = CollectingSink::new();
    // A resolver that points a link back at the root.
    let resolver = |_: &PayloadObject, _: &str| Some(json!(ROOT_ID));
    let variables = Variables::new();
    normalize(
        &mut source,
        Selector {
            data_id: ROOT_ID.into(),
            selections: &selections,
            variables: &variables,
        },
        &json!({ "self": { "name": "Alice" } }),
        NormalizationOptions {
            identity_resolver: Some(&resolver),
            ..NormalizationOptions::default()
        },
        &mut sink,
    )
    .unwrap();

    assert!(sink.warnings.iter().any(|warning| matches!(
        warning,
        NormalizeWarning::TypeMismatch { data_id, .. } if data_id == ROOT_ID
    )));
}
