//! Round action model <-> editor action list.
//!
//! Forward, every token becomes one action carrying a [`RoundTag`] and a
//! readable doc string `第{round}回合·动作{order}：{description} [{token}]`.
//! Backward, the round tag wins, then the doc string, then a guess from the
//! action itself.

use crate::editor::delays::{merge_delays, split_delays};
use crate::editor::{EditorAction, fresh_id};
use crate::maa::{Action, ActionType};
use crate::rounds::token::{DEFAULT_WAIT_MS, MAX_SLOT, MIN_SLOT, Move, Token};
use crate::rounds::{RoundActionModel, RoundTag};
use regex::Regex;
use serde_json::Number;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Post delay (ms) attached to generated actions
pub const DEFAULT_POST_DELAY: u32 = 1000;

// Docs written by `render_doc`. The token runs from the first ` [` after the
// description up to the final `]`, so it may itself contain brackets.
static RENDERED_DOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^第(\d+)回合·动作\d+：.*? \[(.*)\]\s*$").expect("rendered doc regex")
});

static ROUND_ORDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第(\d+)回合·动作(\d+)").expect("round/order regex"));

static TOKEN_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]\s*$").expect("token suffix regex"));

static SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"槽位(\d+)").expect("slot regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct MapperOptions {
    /// Slot to operator name, only used in doc strings
    pub slot_assignments: BTreeMap<u8, String>,
    pub default_post_delay: u32,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            slot_assignments: BTreeMap::new(),
            default_post_delay: DEFAULT_POST_DELAY,
        }
    }
}

impl MapperOptions {
    pub fn with_slot(mut self, slot: u8, name: impl Into<String>) -> Self {
        self.slot_assignments.insert(slot, name.into());
        self
    }

    fn slot_label(&self, slot: u8) -> String {
        match self.slot_assignments.get(&slot) {
            Some(name) if !name.is_empty() => format!("槽位{}（{}）", slot, name),
            _ => format!("槽位{}", slot),
        }
    }
}

/// Assigns slots by position, the first operator takes slot 1.
pub fn slot_assignments_from_opers<'a, I>(names: I) -> BTreeMap<u8, String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .zip(MIN_SLOT..=MAX_SLOT)
        .map(|(name, slot)| (slot, name.to_string()))
        .collect()
}

pub fn describe_token(token: &Token, options: &MapperOptions) -> String {
    match token {
        Token::Basic { slot, mv } => {
            format!("{}{}", options.slot_label(*slot), mv.describe())
        }
        Token::Again { slot, mv } => {
            format!("额外行动：{}{}", options.slot_label(*slot), mv.describe())
        }
        Token::Wait { ms } => format!("等待{}毫秒", ms),
        Token::SwitchLeft => "切换到左侧目标".to_string(),
        Token::SwitchRight => "切换到右侧目标".to_string(),
        Token::RestartFull => "全灭重开".to_string(),
        Token::RestartManual => "点左上角重开".to_string(),
        Token::Unknown(_) => "未识别的指令".to_string(),
    }
}

pub fn render_doc(round: u32, order: usize, token: &Token, options: &MapperOptions) -> String {
    format!(
        "第{}回合·动作{}：{} [{}]",
        round,
        order + 1,
        describe_token(token, options),
        token
    )
}

/// One token to one wire action. Delays are not split here.
pub fn token_to_action(
    round: u32,
    order: usize,
    token: &Token,
    options: &MapperOptions,
) -> Action {
    let mut action = match token {
        Token::Basic { slot, .. } | Token::Again { slot, .. } => {
            let mut action = Action::new(ActionType::Skill);
            action.name = options.slot_assignments.get(slot).cloned();
            action.location = Some([i32::from(*slot), 0]);
            action
        }
        Token::Wait { .. } | Token::Unknown(_) => Action::new(ActionType::Output),
        Token::SwitchLeft => {
            let mut action = Action::new(ActionType::MoveCamera);
            action.distance = Some([Number::from(-1), Number::from(0)]);
            action
        }
        Token::SwitchRight => {
            let mut action = Action::new(ActionType::MoveCamera);
            action.distance = Some([Number::from(1), Number::from(0)]);
            action
        }
        Token::RestartFull | Token::RestartManual => Action::new(ActionType::SkillDaemon),
    };

    action.post_delay = Some(match token {
        Token::Wait { ms } => *ms,
        _ => options.default_post_delay,
    });
    action.doc = Some(render_doc(round, order, token, options));
    action
}

/// Wire actions with their round tags, ordered by (round, order).
pub fn round_actions_to_actions(
    model: &RoundActionModel,
    options: &MapperOptions,
) -> Vec<(Action, RoundTag)> {
    let mut out = Vec::with_capacity(model.token_count());
    for (round, tokens) in model.rounds() {
        for (order, raw) in tokens.iter().enumerate() {
            let token = Token::parse(raw);
            if let Token::Unknown(raw) = &token {
                debug!(round, token = %raw, "Preserving unrecognised round token");
            }
            let action = token_to_action(round, order, &token, options);
            let tag = RoundTag {
                round,
                order,
                token: raw.clone(),
            };
            out.push((action, tag));
        }
    }
    out
}

pub fn round_actions_to_editor_actions(
    model: &RoundActionModel,
    options: &MapperOptions,
) -> Vec<EditorAction> {
    let (actions, tags): (Vec<Action>, Vec<RoundTag>) =
        round_actions_to_actions(model, options).into_iter().unzip();

    let mut editor = split_delays(&actions);
    for (action, tag) in editor.iter_mut().zip(tags) {
        action.id = fresh_id();
        action.round_tag = Some(tag);
    }

    debug!(
        rounds = model.round_count(),
        actions = editor.len(),
        "Mapped round actions to editor actions"
    );
    editor
}

/// Editor actions back to a round action model.
///
/// An action whose round cannot be recovered stays in the previous action's
/// round, or round 1 when it comes first.
pub fn editor_actions_to_round_actions(actions: &[EditorAction]) -> RoundActionModel {
    let wire = merge_delays(actions);
    let mut model = RoundActionModel::new();
    let mut last_round = 1u32;

    for (editor, action) in actions.iter().zip(&wire) {
        let (round, token) = recover(editor, action);
        let round = round.unwrap_or(last_round);
        last_round = round;
        model.push(round, token);
    }

    model.normalized()
}

fn recover(editor: &EditorAction, action: &Action) -> (Option<u32>, String) {
    if let Some(tag) = &editor.round_tag {
        return (Some(tag.round), refine_wait(&tag.token, action));
    }

    let doc = action.doc.as_deref().unwrap_or_default();
    if let Some(caps) = RENDERED_DOC_RE.captures(doc) {
        let round = caps[1].parse::<u32>().ok();
        return (round, refine_wait(&caps[2], action));
    }

    let round = ROUND_ORDER_RE
        .captures(doc)
        .and_then(|caps| caps[1].parse::<u32>().ok());
    let token = TOKEN_SUFFIX_RE
        .captures(doc)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty());

    match token {
        Some(token) => (round, refine_wait(&token, action)),
        None => {
            let token = infer_token(action);
            warn!(
                kind = action.kind.as_str(),
                token = %token,
                "Inferred round token from action without recoverable metadata"
            );
            (round, token.to_string())
        }
    }
}

/// A wait token takes the action's actual post delay.
fn refine_wait(raw: &str, action: &Action) -> String {
    match (Token::parse(raw), action.post_delay) {
        (Token::Wait { .. }, Some(ms)) if action.kind == ActionType::Output => {
            Token::Wait { ms }.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Guesses a valid token from the action type and its doc string.
pub fn infer_token(action: &Action) -> Token {
    let doc = action.doc.as_deref().unwrap_or_default();
    match action.kind {
        ActionType::Output => Token::Wait {
            ms: action.post_delay.unwrap_or(DEFAULT_WAIT_MS),
        },
        ActionType::MoveCamera => match &action.distance {
            Some([x, _]) if x.as_f64().is_some_and(|x| x < 0.0) => Token::SwitchLeft,
            _ => Token::SwitchRight,
        },
        ActionType::SkillDaemon => {
            if doc.contains("左上角") {
                Token::RestartManual
            } else {
                Token::RestartFull
            }
        }
        _ => {
            let slot = infer_slot(action, doc);
            let mv = if doc.contains("大招") || doc.contains("上拉") {
                Move::Ultimate
            } else if doc.contains("防御") || doc.contains("下拉") {
                Move::Defense
            } else {
                Move::Normal
            };
            if doc.contains("额外") || doc.contains("再动") {
                Token::Again { slot, mv }
            } else {
                Token::Basic { slot, mv }
            }
        }
    }
}

fn infer_slot(action: &Action, doc: &str) -> u8 {
    let valid = |n: u8| (MIN_SLOT..=MAX_SLOT).contains(&n).then_some(n);
    SLOT_RE
        .captures(doc)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .and_then(valid)
        .or_else(|| {
            action
                .location
                .and_then(|[x, _]| u8::try_from(x).ok())
                .and_then(valid)
        })
        .unwrap_or(MIN_SLOT)
}
