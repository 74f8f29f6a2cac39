use maa_copilot::editor::DelaySource;
use maa_copilot::editor::delays::{merge_delays, split_delays};
use maa_copilot::maa::{Action, ActionType};

fn action(kind: ActionType, pre: Option<u32>, post: Option<u32>, rear: Option<u32>) -> Action {
    Action {
        kind,
        pre_delay: pre,
        post_delay: post,
        rear_delay: rear,
        ..Default::default()
    }
}

#[test]
fn test_delays_move_onto_neighbouring_cards() {
    let wire = vec![
        action(ActionType::Deploy, Some(100), Some(200), None),
        action(ActionType::Skill, Some(300), Some(400), None),
    ];
    let editor = split_delays(&wire);

    assert_eq!(editor[0].intermediate_post_delay, Some(100));
    assert_eq!(editor[0].intermediate_pre_delay, None);
    assert_eq!(editor[1].intermediate_post_delay, Some(300));
    assert_eq!(editor[1].intermediate_pre_delay, Some(200));
    // the last post_delay has no following card and stays put
    assert_eq!(editor[1].action.post_delay, Some(400));
    assert_eq!(editor[0].action.post_delay, None);

    assert_eq!(merge_delays(&editor), wire);
}

#[test]
fn test_speed_up_prefers_rear_delay() {
    let wire = vec![
        action(ActionType::Deploy, None, Some(200), Some(500)),
        action(ActionType::SpeedUp, None, None, None),
    ];
    let editor = split_delays(&wire);
    assert_eq!(editor[1].intermediate_pre_delay, Some(500));
    assert_eq!(editor[1].pre_delay_source, DelaySource::RearDelay);
    assert_eq!(editor[0].action.post_delay, Some(200));
    assert_eq!(merge_delays(&editor), wire);
}

#[test]
fn test_speed_up_falls_back_to_post_delay() {
    let wire = vec![
        action(ActionType::Deploy, None, Some(200), None),
        action(ActionType::SpeedUp, None, None, None),
    ];
    let editor = split_delays(&wire);
    assert_eq!(editor[1].intermediate_pre_delay, Some(200));
    assert_eq!(editor[1].pre_delay_source, DelaySource::PostDelay);
    assert_eq!(merge_delays(&editor), wire);
}
