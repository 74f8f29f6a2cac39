//! Fixed geometry and node templates for Siming graphs.
//!
//! Coordinates are in the 1280x720 reference resolution the external runtime
//! expects. Changing any of them breaks existing graphs.

use super::{
    ActionDelays, NodeAction, RESTART_FULL_KEY, RESTART_MANUAL_KEY, Recognition, SimingNode,
    VICTORY_KEY,
};
use crate::rounds::token::{MAX_SLOT, MIN_SLOT, Move};
use std::collections::BTreeMap;

/// Card centers for slots 1-5
pub const SLOT_ANCHORS: [[i32; 2]; 5] = [
    [284, 560],
    [462, 560],
    [640, 560],
    [818, 560],
    [996, 560],
];

pub const CARD_SIZE: [i32; 2] = [120, 160];
pub const SWIPE_BOX: i32 = 20;
pub const SWIPE_DISTANCE: i32 = 120;
pub const SWIPE_DURATION: u32 = 300;

/// Where the round counter is drawn
pub const ROUND_ROI: [i32; 4] = [1040, 20, 220, 60];

pub const LEFT_TARGET: [i32; 4] = [240, 240, 100, 100];
pub const RIGHT_TARGET: [i32; 4] = [940, 240, 100, 100];
pub const SWITCH_POST_DELAY: u32 = 500;

pub const VICTORY_ROI: [i32; 4] = [440, 260, 400, 200];
pub const RESTART_ROI: [i32; 4] = [440, 420, 400, 160];

pub const BACK_ROI: [i32; 4] = [0, 0, 180, 110];
pub const BACK_TEMPLATE: &str = "抄作业/返回.png";
pub const BACK_THRESHOLD: f64 = 0.8;
pub const BACK_TIMEOUT: u32 = 5000;

/// Template key, `{slot}号位{普攻|上拉|下拉}`
pub fn template_key(slot: u8, mv: Move) -> String {
    format!("{}号位{}", slot, mv.gesture())
}

fn slot_anchor(slot: u8) -> Option<[i32; 2]> {
    if !(MIN_SLOT..=MAX_SLOT).contains(&slot) {
        return None;
    }
    SLOT_ANCHORS.get(usize::from(slot - MIN_SLOT)).copied()
}

fn action_template(slot: u8, mv: Move, delays: &ActionDelays) -> Option<SimingNode> {
    let [x, y] = slot_anchor(slot)?;
    let half = SWIPE_BOX / 2;
    let node = match mv {
        Move::Normal => SimingNode {
            action: Some(NodeAction::Click),
            target: Some([
                x - CARD_SIZE[0] / 2,
                y - CARD_SIZE[1] / 2,
                CARD_SIZE[0],
                CARD_SIZE[1],
            ]),
            post_delay: Some(delays.attack),
            ..Default::default()
        },
        Move::Ultimate => SimingNode {
            action: Some(NodeAction::Swipe),
            begin: Some([x - half, y - half, SWIPE_BOX, SWIPE_BOX]),
            end: Some([x - half, y - half - SWIPE_DISTANCE, SWIPE_BOX, SWIPE_BOX]),
            duration: Some(SWIPE_DURATION),
            post_delay: Some(delays.ultimate),
            ..Default::default()
        },
        Move::Defense => SimingNode {
            action: Some(NodeAction::Swipe),
            begin: Some([x - half, y - half, SWIPE_BOX, SWIPE_BOX]),
            end: Some([x - half, y - half + SWIPE_DISTANCE, SWIPE_BOX, SWIPE_BOX]),
            duration: Some(SWIPE_DURATION),
            post_delay: Some(delays.defense),
            ..Default::default()
        },
    };
    Some(node)
}

/// All 15 slot templates
pub fn action_templates(delays: &ActionDelays) -> BTreeMap<String, SimingNode> {
    let mut templates = BTreeMap::new();
    for slot in MIN_SLOT..=MAX_SLOT {
        for mv in Move::ALL {
            if let Some(node) = action_template(slot, mv, delays) {
                templates.insert(template_key(slot, mv), node);
            }
        }
    }
    templates
}

pub fn detection_node(round: u32) -> SimingNode {
    SimingNode {
        recognition: Some(Recognition::Ocr),
        expected: Some(vec![format!("回合{}", round)]),
        roi: Some(ROUND_ROI),
        ..Default::default()
    }
}

pub fn wait_node(ms: u32) -> SimingNode {
    SimingNode {
        action: Some(NodeAction::DoNothing),
        post_delay: Some(ms),
        ..Default::default()
    }
}

pub fn switch_node(left: bool) -> SimingNode {
    SimingNode {
        action: Some(NodeAction::Click),
        target: Some(if left { LEFT_TARGET } else { RIGHT_TARGET }),
        post_delay: Some(SWITCH_POST_DELAY),
        ..Default::default()
    }
}

pub fn victory_node() -> SimingNode {
    SimingNode {
        recognition: Some(Recognition::Ocr),
        expected: Some(vec!["战斗胜利".to_string()]),
        roi: Some(VICTORY_ROI),
        text_doc: Some("战斗胜利".to_string()),
        ..Default::default()
    }
}

pub fn restart_full_node() -> SimingNode {
    SimingNode {
        recognition: Some(Recognition::Ocr),
        expected: Some(vec!["重新挑战".to_string()]),
        roi: Some(RESTART_ROI),
        action: Some(NodeAction::Click),
        text_doc: Some("全灭重开".to_string()),
        ..Default::default()
    }
}

/// Clicks the back button, then waits for the retry screen or tries again.
pub fn restart_manual_node() -> SimingNode {
    SimingNode {
        recognition: Some(Recognition::TemplateMatch),
        template: Some(BACK_TEMPLATE.to_string()),
        roi: Some(BACK_ROI),
        threshold: Some(BACK_THRESHOLD),
        timeout: Some(BACK_TIMEOUT),
        action: Some(NodeAction::Click),
        next: vec![RESTART_FULL_KEY.to_string(), RESTART_MANUAL_KEY.to_string()],
        text_doc: Some("点左上角重开".to_string()),
        ..Default::default()
    }
}

pub fn fixed_nodes() -> [(&'static str, SimingNode); 3] {
    [
        (VICTORY_KEY, victory_node()),
        (RESTART_FULL_KEY, restart_full_node()),
        (RESTART_MANUAL_KEY, restart_manual_node()),
    ]
}
