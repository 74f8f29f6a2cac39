//! Pasted round action JSON, either `{"actions": {...}, "opers": ...}` or a
//! bare `{"1": [["1普"]]}`.
//!
//! `opers` is an array (slot = index + 1) or an object keyed by slot whose
//! values are names or `{name, skill}`.

use crate::editor::{EditorOperation, EditorOperator};
use crate::error::{CopilotError, Issue, Result};
use crate::rounds::RoundActionModel;
use crate::rounds::mapper::{MapperOptions, round_actions_to_editor_actions};
use crate::rounds::token::{MAX_SLOT, MIN_SLOT};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedOperator {
    pub slot: Option<u8>,
    pub name: String,
    pub skill: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundImport {
    pub model: RoundActionModel,
    pub opers: Vec<ImportedOperator>,
}

pub fn parse_round_import(raw: &str) -> Result<RoundImport> {
    let value: Value = serde_json::from_str(raw).map_err(|e| CopilotError::syntax(&e))?;
    RoundImport::from_value(&value)
}

impl RoundImport {
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(CopilotError::Schema(vec![Issue::root(
                "回合动作必须是 JSON 对象",
            )]));
        };

        let model = match obj.get("actions") {
            Some(actions) if actions.is_object() => RoundActionModel::from_value(actions),
            _ => {
                let mut bare = obj.clone();
                bare.remove("opers");
                RoundActionModel::from_value(&Value::Object(bare))
            }
        };

        let opers = obj.get("opers").map(parse_opers).unwrap_or_default();

        info!(
            rounds = model.round_count(),
            tokens = model.token_count(),
            opers = opers.len(),
            "Parsed round-action import"
        );
        Ok(Self { model, opers })
    }

    /// Slot to operator name. Operators without an explicit slot fill by position.
    pub fn slot_assignments(&self) -> BTreeMap<u8, String> {
        let mut slots = BTreeMap::new();
        for (idx, oper) in self.opers.iter().enumerate() {
            let slot = oper
                .slot
                .or_else(|| u8::try_from(idx + 1).ok())
                .filter(|s| (MIN_SLOT..=MAX_SLOT).contains(s));
            match slot {
                Some(slot) => {
                    slots.entry(slot).or_insert_with(|| oper.name.clone());
                }
                None => warn!(name = %oper.name, "Imported operator has no usable slot"),
            }
        }
        slots
    }

    pub fn into_editor_operation(self, options: &MapperOptions) -> EditorOperation {
        let mut options = options.clone();
        options.slot_assignments.extend(self.slot_assignments());

        let mut operation = EditorOperation::template();
        operation.actions = round_actions_to_editor_actions(&self.model, &options);
        operation.opers = self
            .opers
            .into_iter()
            .map(|oper| {
                let mut editor = EditorOperator::new(oper.name);
                editor.skill = oper.skill;
                editor
            })
            .collect();
        operation
    }
}

fn parse_opers(value: &Value) -> Vec<ImportedOperator> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let slot = u8::try_from(idx + 1).ok();
                parse_oper(item, slot)
            })
            .collect(),
        Value::Object(map) => {
            let mut opers: Vec<ImportedOperator> = map
                .iter()
                .filter_map(|(key, item)| {
                    let Ok(slot) = key.trim().parse::<u8>() else {
                        warn!(key = %key, "Skipping non-numeric operator slot");
                        return None;
                    };
                    parse_oper(item, Some(slot))
                })
                .collect();
            opers.sort_by_key(|o| o.slot);
            opers
        }
        _ => Vec::new(),
    }
}

fn parse_oper(item: &Value, slot: Option<u8>) -> Option<ImportedOperator> {
    let (name, skill, explicit_slot) = match item {
        Value::String(name) => (name.trim().to_string(), None, None),
        Value::Object(obj) => {
            let name = obj.get("name").and_then(Value::as_str)?.trim().to_string();
            let skill = obj
                .get("skill")
                .and_then(Value::as_u64)
                .and_then(|s| u8::try_from(s).ok());
            let explicit_slot = obj
                .get("slot")
                .and_then(Value::as_u64)
                .and_then(|s| u8::try_from(s).ok());
            (name, skill, explicit_slot)
        }
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }
    Some(ImportedOperator {
        slot: explicit_slot.or(slot),
        name,
        skill,
    })
}
