use maa_copilot::maa::builder::OperationBuilder;
use maa_copilot::maa::{
    ActionType, ActionsField, DEFAULT_MINIMUM_REQUIRED, Doc, Operation, Operator, Requirements,
};
use maa_copilot::reconcile::{to_editor_operation, to_maa_operation};
use maa_copilot::schema::{parse_loose, parse_loose_with_issues, validate, validate_json};
use maa_copilot::{CopilotError, Issue};
use serde_json::json;

#[test]
fn test_strict_validation_collects_all_issues() {
    let operation = OperationBuilder::new("")
        .oper("")
            .build()
        .oper("塞雷娅")
            .elite(3)
            .level(0)
            .disc(1)
            .disc(2)
            .disc(3)
            .disc(-2)
            .build()
        .action(ActionType::Deploy)
            .build()
        .action(ActionType::MoveCamera)
            .build()
        .action(ActionType::Other("Teleport".to_string()))
            .build()
        .build();

    let paths: Vec<String> = validate(&operation)
        .iter()
        .map(|issue| issue.dotted_path())
        .collect();
    assert_eq!(
        paths,
        vec![
            "stage_name",
            "doc.title",
            "opers.0.name",
            "opers.1.requirements.elite",
            "opers.1.requirements.level",
            "opers.1.discs",
            "opers.1.discs.3",
            "actions.0.name",
            "actions.0.location",
            "actions.1.distance",
            "actions.2.type",
        ]
    );
}

#[test]
fn test_graph_actions_are_checked_for_dangling_edges() {
    let issues = validate_json(
        r#"{
            "stage_name": "1-7",
            "doc": {"title": "图"},
            "actions": {
                "检测回合1": {"recognition": "OCR", "next": ["回合1行动1"]}
            }
        }"#,
    )
    .unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, vec!["actions", "检测回合1", "next"]);
}

#[test]
fn test_validate_json_reports_syntax_errors() {
    match validate_json("{\"stage_name\": ") {
        Err(CopilotError::Syntax { line, .. }) => assert_eq!(line, 1),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_loose_output_feeds_every_mapper() {
    let raw = json!({
        "minimumRequired": null,
        "stageName": 107,
        "doc": "只有标题",
        "opers": ["能天使", {"name": "陈", "skill": "2", "discs": ["1", "x"]}, 3],
        "groups": {"not": "an array"},
        "actions": [
            {"type": "部署", "name": "能天使", "location": [1, 2], "preDelay": "100"},
            {"type": "SpeedUp", "rearDelay": -5},
            "garbage",
            {"type": "MoveCamera", "distance": [1]}
        ],
        "unknownTopLevel": [1, 2, 3]
    });
    let (operation, issues) = parse_loose_with_issues(&raw.to_string()).unwrap();
    assert!(!issues.is_empty());

    assert_eq!(operation.stage_name, "107");
    assert_eq!(operation.doc.title, "只有标题");
    assert_eq!(operation.opers.len(), 2);
    assert_eq!(operation.opers[1].skill, Some(2));
    assert_eq!(operation.opers[1].discs, Some(vec![1]));
    assert!(operation.groups.is_empty());
    assert_eq!(operation.extra["unknown_top_level"], json!([1, 2, 3]));

    let actions = operation.actions.as_flat().unwrap();
    assert_eq!(actions.len(), 3);
    assert_eq!(actions[0].kind, ActionType::Deploy);
    assert_eq!(actions[0].pre_delay, Some(100));
    assert_eq!(actions[1].rear_delay, None);
    assert_eq!(actions[2].distance, None);

    let editor = to_editor_operation(&operation);
    let wire = to_maa_operation(&editor);
    assert_eq!(wire.actions, operation.actions);
}

#[test]
fn test_loose_accepts_legacy_graph_shape() {
    let raw = r#"{"actions": {"回合1行动1": {"textDoc": "1普", "postDelay": "3000", "roi": [1]}}}"#;
    let operation = parse_loose(raw).unwrap();
    let ActionsField::Graph(graph) = operation.actions else {
        panic!("expected graph actions");
    };
    let node = &graph["回合1行动1"];
    assert_eq!(node.post_delay, Some(3000));
    assert_eq!(node.roi, None);
}

#[test]
fn test_loose_fills_minimum_required_and_keeps_unknown_fields() {
    let op = parse_loose(r#"{"stageName": "1-7", "customField": {"a": 1}}"#).unwrap();
    assert_eq!(op.minimum_required.as_deref(), Some(DEFAULT_MINIMUM_REQUIRED));
    assert_eq!(op.stage_name, "1-7");
    assert_eq!(op.extra["custom_field"], json!({"a": 1}));
}

#[test]
fn test_loose_coerces_numeric_strings() {
    let (op, issues) = parse_loose_with_issues(
        r#"{"opers": [{"name": "桃金娘", "skill": "1", "requirements": {"elite": "2"}}],
            "actions": [{"type": "Deploy", "location": ["3", 4.0], "postDelay": "500"}, 7]}"#,
    )
    .unwrap();
    assert_eq!(op.opers[0].skill, Some(1));
    assert_eq!(op.opers[0].requirements.as_ref().unwrap().elite, Some(2));
    let actions = op.actions.as_flat().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].location, Some([3, 4]));
    assert_eq!(actions[0].post_delay, Some(500));
    assert!(issues.iter().any(|i| i.dotted_path() == "actions.1"));
}

#[test]
fn test_loose_keeps_integer_camera_distance() {
    let raw = r#"{"actions": [{"type": "MoveCamera", "distance": [1, 0.5]}]}"#;
    let op = parse_loose(raw).unwrap();
    let wire = serde_json::to_value(&op).unwrap();
    assert_eq!(wire["actions"][0]["distance"], json!([1, 0.5]));
}

#[test]
fn test_graph_keys_survive_casing() {
    let raw = r#"{"actions": {"回合1行动1": {"textDoc": "1普", "next": "抄作业战斗胜利"}}}"#;
    let op = parse_loose(raw).unwrap();
    let ActionsField::Graph(graph) = &op.actions else {
        panic!("expected graph actions");
    };
    let node = &graph["回合1行动1"];
    assert_eq!(node.text_doc.as_deref(), Some("1普"));
    assert_eq!(node.next, vec!["抄作业战斗胜利".to_string()]);
}

#[test]
fn test_round_actions_in_actions_become_flat() {
    let op = parse_loose(r#"{"actions": {"1": [["1普"], ["2大"]]}}"#).unwrap();
    assert_eq!(op.actions.as_flat().map(<[_]>::len), Some(2));
}

#[test]
fn test_syntax_errors_are_distinguishable() {
    assert!(parse_loose("{\"doc\":").unwrap_err().is_syntax());
    assert!(!parse_loose("[]").unwrap_err().is_syntax());
}

fn titled_operation() -> Operation {
    Operation {
        stage_name: "1-7".to_string(),
        doc: Doc {
            title: "标题".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_strict_issue_order_follows_the_document() {
    let mut op = titled_operation();
    op.stage_name.clear();
    op.opers = vec![
        Operator {
            skill: Some(4),
            ..Operator::new("阿")
        },
        Operator::new("阿"),
    ];
    op.opers[1].requirements = Some(Requirements {
        elite: Some(3),
        ..Default::default()
    });

    let paths: Vec<String> = validate(&op).iter().map(Issue::dotted_path).collect();
    assert_eq!(
        paths,
        vec![
            "stage_name",
            "opers.0.skill",
            "opers.1.name",
            "opers.1.requirements.elite",
        ]
    );
}

#[test]
fn test_valid_operation_has_no_issues() {
    assert!(validate(&titled_operation()).is_empty());
}
