use maa_copilot::config::Config;
use maa_copilot::editor::session::EditorSession;

const WIRE: &str = r#"{
    "version": 3,
    "stage_name": "main_01-07",
    "doc": {"title": "1-7"},
    "opers": [{"name": "能天使", "skill": 3}],
    "actions": [{"type": "Deploy", "name": "能天使", "location": [5, 3], "post_delay": 500}]
}"#;

#[test]
fn test_malformed_json_leaves_state_untouched() {
    let mut session = EditorSession::default();
    session.import_json(WIRE).unwrap();
    session.apply("改标题", None, |op| op.doc.title = "新标题".to_string());
    let before = session.operation().clone();
    let history_len = session.history().len();

    let err = session.import_json("{\"stage_name\": \"1-7\",").unwrap_err();
    assert!(err.is_syntax());
    assert!(err.to_string().contains("JSON"));

    assert_eq!(session.operation(), &before);
    assert_eq!(session.history().len(), history_len);
    assert!(session.undo());
}

#[test]
fn test_import_resets_history() {
    let mut session = EditorSession::default();
    session.apply("改关卡", None, |op| op.stage_name = "x".to_string());
    assert!(session.history().can_undo());

    session.import_json(WIRE).unwrap();
    assert!(!session.history().can_undo());
    assert_eq!(session.operation().stage_name, "main_01-07");
}

#[test]
fn test_typing_squashes_into_one_undo_step() {
    let mut session = EditorSession::default();
    session.import_json(WIRE).unwrap();
    for title in ["新", "新标", "新标题"] {
        session.apply("输入标题", Some("doc.title"), |op| op.doc.title = title.to_string());
    }
    assert_eq!(session.operation().doc.title, "新标题");
    assert!(session.undo());
    assert_eq!(session.operation().doc.title, "1-7");
    assert!(!session.undo());
    assert!(session.redo());
    assert_eq!(session.operation().doc.title, "新标题");
}

#[test]
fn test_submission_does_not_touch_history() {
    let mut session = EditorSession::default();
    session.import_json(WIRE).unwrap();
    let len = session.history().len();

    let submission = session.submission();
    assert!(submission.is_valid(), "{:?}", submission.issues);
    assert_eq!(submission.operation.stage_name, "main_01-07");
    assert_eq!(session.history().len(), len);

    let preview = session.wire_preview().unwrap();
    assert_eq!(preview["actions"][0]["post_delay"], 500);
    assert!(preview["opers"][0].get("id").is_none());
}

#[test]
fn test_round_import_replaces_actions() {
    let config = Config {
        default_post_delay: 800,
        ..Default::default()
    };
    let mut session = EditorSession::from_config(&config);
    session
        .import_rounds(r#"{"actions": {"1": [["1普"], ["2大"]]}, "opers": ["玛恩纳", "维什戴尔"]}"#)
        .unwrap();

    let operation = session.operation();
    assert_eq!(operation.opers.len(), 2);
    assert_eq!(operation.actions.len(), 2);
    assert_eq!(operation.actions[1].action.name.as_deref(), Some("维什戴尔"));
    assert_eq!(operation.actions[1].intermediate_pre_delay, Some(800));

    assert!(session.undo());
    assert!(session.operation().actions.is_empty());
}

#[test]
fn test_drag_reorder_moves_actions_by_id() {
    let mut session = EditorSession::default();
    session
        .import_rounds(r#"{"actions": {"1": [["1普"], ["2大"], ["3下"]]}}"#)
        .unwrap();
    let ids: Vec<String> = session
        .operation()
        .actions
        .iter()
        .map(|a| a.id.clone())
        .collect();
    let last = ids[2].clone();
    assert!(session.operation().find_action(&last).is_some());

    assert!(session.apply("拖动排序", None, |op| {
        op.move_action(&last, 0);
    }));
    let order: Vec<&str> = session
        .operation()
        .actions
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(order, [ids[2].as_str(), ids[0].as_str(), ids[1].as_str()]);

    // past the end lands last
    let mut operation = session.operation().clone();
    assert!(operation.move_action(&last, 99));
    assert_eq!(operation.actions[2].id, last);
    assert!(!operation.move_action("missing", 0));
    assert!(operation.find_action("missing").is_none());

    assert!(session.undo());
    assert_eq!(session.operation().actions[0].id, ids[0]);
}
