//! Editor format. Every operator, group, grouped operator and action carries an
//! `id` that only exists while editing, used for diffing, drag reordering and undo.

pub mod delays;
pub mod history;
pub mod session;

use crate::error::{CopilotError, Issue, Result};
use crate::maa::{
    Action, CURRENT_VERSION, DEFAULT_MINIMUM_REQUIRED, Doc, Operator, OperatorExtensions,
    Requirements,
};
use crate::reconcile::casing::{Case, convert_keys};
use crate::rounds::RoundTag;
use crate::siming::{ActionDelays, SimingGraph};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use delays::DelaySource;

pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_required: Option<String>,
    #[serde(default)]
    pub stage_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub opers: Vec<EditorOperator>,
    #[serde(default)]
    pub groups: Vec<EditorGroup>,
    #[serde(default)]
    pub actions: Vec<EditorAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siming_actions: Option<SimingGraph>,
    #[serde(default)]
    pub action_delays: ActionDelays,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EditorOperation {
    /// Blank document for a new operation
    pub fn template() -> Self {
        Self {
            version: Some(CURRENT_VERSION),
            minimum_required: Some(DEFAULT_MINIMUM_REQUIRED.to_string()),
            ..Default::default()
        }
    }

    /// Assigns fresh ids to every entity
    pub fn hydrate(&mut self) {
        for oper in &mut self.opers {
            oper.id = fresh_id();
        }
        for group in &mut self.groups {
            group.id = fresh_id();
            for oper in &mut group.opers {
                oper.id = fresh_id();
            }
        }
        for action in &mut self.actions {
            action.id = fresh_id();
        }
    }

    pub fn find_action(&self, id: &str) -> Option<&EditorAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Moves an action to `to`, clamped to the end. Returns false for an unknown id.
    pub fn move_action(&mut self, id: &str, to: usize) -> bool {
        let Some(from) = self.actions.iter().position(|a| a.id == id) else {
            return false;
        };
        let action = self.actions.remove(from);
        let to = to.min(self.actions.len());
        self.actions.insert(to, action);
        true
    }

    /// camelCase JSON view. Graph node names are kept as they are.
    pub fn to_json(&self) -> Result<Value> {
        let value = serde_json::to_value(self)?;
        Ok(convert_keys(value, Case::Camel, &["siming_actions"]))
    }

    pub fn from_json(value: Value) -> Result<Self> {
        let value = convert_keys(value, Case::Snake, &["simingActions"]);
        serde_json::from_value(value)
            .map_err(|e| CopilotError::Schema(vec![Issue::root(e.to_string())]))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorOperator {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_usage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
    /// Only home of discs, star level and stats. The flat keys are written on dehydrate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<OperatorExtensions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EditorOperator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_wire(op: &Operator) -> Self {
        Self {
            id: String::new(),
            name: op.name.clone(),
            skill: op.skill,
            skill_usage: op.skill_usage,
            skill_times: op.skill_times,
            requirements: op.requirements.clone(),
            extensions: op.extensions_view(),
            extra: op.extra.clone(),
        }
    }

    pub fn to_wire(&self) -> Operator {
        let mut op = Operator {
            name: self.name.clone(),
            skill: self.skill,
            skill_usage: self.skill_usage,
            skill_times: self.skill_times,
            requirements: self.requirements.clone(),
            extra: self.extra.clone(),
            ..Default::default()
        };
        op.set_extensions(self.extensions.clone());
        op
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub opers: Vec<EditorOperator>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An action card in the editor.
///
/// The wire format puts delays between neighbouring actions; the editor keeps them on
/// one card. `intermediate_post_delay` is this action's wire `pre_delay`, and
/// `intermediate_pre_delay` is the previous action's `post_delay` (`rear_delay` for
/// speed-up).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorAction {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_pre_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_post_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "DelaySource::is_post")]
    pub pre_delay_source: DelaySource,
    /// Set when the card was generated from a round token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_tag: Option<RoundTag>,
}

impl EditorAction {
    pub fn new(action: Action) -> Self {
        Self {
            id: fresh_id(),
            action,
            ..Default::default()
        }
    }
}
