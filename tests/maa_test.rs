use maa_copilot::maa::builder::OperationBuilder;
use maa_copilot::maa::{Action, ActionType, DISC_ANY, DiscSelection, Operator};
use serde_json::{Number, json};

#[test]
fn test_action_type_accepts_aliases_and_keeps_unknown() {
    assert_eq!(ActionType::parse("部署"), ActionType::Deploy);
    assert_eq!(ActionType::parse("speedup"), ActionType::SpeedUp);
    assert_eq!(ActionType::parse("Teleport"), ActionType::Other("Teleport".into()));
    assert_eq!(String::from(ActionType::Other("Teleport".into())), "Teleport");
}

#[test]
fn test_flat_and_nested_extensions_stay_in_sync() {
    let mut op: Operator = serde_json::from_value(json!({
        "name": "能天使",
        "discs": [2, -1],
        "star_level": 4
    }))
    .unwrap();

    let view = op.extensions_view().unwrap();
    assert_eq!(view.discs, vec![DiscSelection::new(2), DiscSelection::new(DISC_ANY)]);
    assert_eq!(view.star_level, Some(4));

    op.set_extensions(Some(view));
    let written = serde_json::to_value(&op).unwrap();
    assert_eq!(written["discs"], json!([2, -1]));
    assert_eq!(written["extensions"]["discs"][1]["index"], json!(-1));
    assert_eq!(written["extensions"]["star_level"], json!(4));
}

#[test]
fn test_nested_extensions_win_over_flat() {
    let op: Operator = serde_json::from_value(json!({
        "name": "陈",
        "attack": 100,
        "hp": 50,
        "extensions": { "attack": 300 }
    }))
    .unwrap();
    let view = op.extensions_view().unwrap();
    assert_eq!(view.attack, Some(300));
    assert_eq!(view.hp, Some(50));
}

#[test]
fn test_camera_distance_keeps_its_number_form() {
    let operation = OperationBuilder::new("main_01-07")
        .action(ActionType::MoveCamera)
            .distance([0.5, 0.0])
            .build()
        .action(ActionType::MoveCamera)
            .distance([f64::NAN, 0.0])
            .build()
        .build();
    let actions = operation.actions.as_flat().unwrap();
    assert_eq!(actions[0].distance.as_ref().unwrap()[0].as_f64(), Some(0.5));
    assert_eq!(actions[1].distance, None);

    let parsed: Action =
        serde_json::from_value(json!({"type": "MoveCamera", "distance": [1, 0]})).unwrap();
    assert_eq!(parsed.distance, Some([Number::from(1), Number::from(0)]));
    assert_eq!(serde_json::to_value(&parsed).unwrap()["distance"], json!([1, 0]));
}
