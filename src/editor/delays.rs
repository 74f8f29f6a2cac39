//! Splits wire delays onto editor cards and merges them back.
//!
//! For every i > 0:
//! - `wire[i].pre_delay == editor[i].intermediate_post_delay`
//! - `wire[i-1].post_delay == editor[i].intermediate_pre_delay`
//!
//! A SpeedUp card takes the previous action's `rear_delay` when present and
//! falls back to `post_delay`. Merging writes back to the field it came from.

use crate::editor::EditorAction;
use crate::maa::{Action, ActionType};
use serde::{Deserialize, Serialize};

/// Which field of the previous action `intermediate_pre_delay` came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelaySource {
    #[default]
    PostDelay,
    RearDelay,
}

impl DelaySource {
    pub fn is_post(&self) -> bool {
        matches!(self, DelaySource::PostDelay)
    }
}

/// Returned cards have empty ids, callers assign them.
pub fn split_delays(actions: &[Action]) -> Vec<EditorAction> {
    let mut out: Vec<EditorAction> = actions
        .iter()
        .cloned()
        .map(|action| EditorAction {
            action,
            ..Default::default()
        })
        .collect();

    for i in 0..out.len() {
        out[i].intermediate_post_delay = out[i].action.pre_delay.take();

        if i == 0 {
            continue;
        }
        let (head, tail) = out.split_at_mut(i);
        let prev = &mut head[i - 1].action;
        let cur = &mut tail[0];

        if cur.action.kind == ActionType::SpeedUp {
            if let Some(delay) = prev.rear_delay.take() {
                cur.intermediate_pre_delay = Some(delay);
                cur.pre_delay_source = DelaySource::RearDelay;
            } else {
                cur.intermediate_pre_delay = prev.post_delay.take();
            }
        } else {
            cur.intermediate_pre_delay = prev.post_delay.take();
        }
    }

    out
}

/// Inverse of [`split_delays`].
pub fn merge_delays(actions: &[EditorAction]) -> Vec<Action> {
    let mut out: Vec<Action> = actions.iter().map(|a| a.action.clone()).collect();

    for (i, editor) in actions.iter().enumerate() {
        if let Some(delay) = editor.intermediate_post_delay {
            out[i].pre_delay = Some(delay);
        }

        if i == 0 {
            continue;
        }
        if let Some(delay) = editor.intermediate_pre_delay {
            let prev = &mut out[i - 1];
            match editor.pre_delay_source {
                DelaySource::RearDelay => prev.rear_delay = Some(delay),
                DelaySource::PostDelay => prev.post_delay = Some(delay),
            }
        }
    }

    out
}
