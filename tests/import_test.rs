use maa_copilot::rounds::import::{RoundImport, parse_round_import};
use maa_copilot::rounds::mapper::MapperOptions;
use serde_json::json;

#[test]
fn test_accepts_wrapped_and_bare_shapes() {
    let wrapped = RoundImport::from_value(&json!({
        "actions": {"1": [["1普"]]},
        "opers": ["玛恩纳", "维什戴尔"]
    }))
    .unwrap();
    let bare = RoundImport::from_value(&json!({
        "1": [["1普"]],
        "opers": ["玛恩纳", "维什戴尔"]
    }))
    .unwrap();
    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.slot_assignments()[&2], "维什戴尔");
}

#[test]
fn test_operator_map_keys_are_slots() {
    let import = RoundImport::from_value(&json!({
        "actions": {"2": [["3大"]]},
        "opers": {"3": {"name": "史尔特尔", "skill": 3}, "1": "能天使"}
    }))
    .unwrap();
    assert_eq!(import.opers[0].name, "能天使");
    assert_eq!(import.opers[1].skill, Some(3));
    assert_eq!(import.slot_assignments()[&3], "史尔特尔");

    let operation = import.into_editor_operation(&MapperOptions::default());
    assert_eq!(operation.opers.len(), 2);
    assert_eq!(operation.actions[0].action.name.as_deref(), Some("史尔特尔"));
}

#[test]
fn test_rejects_non_object() {
    assert!(parse_round_import("[1, 2]").is_err());
    assert!(parse_round_import("{").unwrap_err().is_syntax());
}
