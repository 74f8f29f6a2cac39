//! Wire format <-> editor format.
//!
//! Both directions are pure. Inputs are cloned before anything is changed.

pub mod casing;
pub mod loader;
pub mod migrate;

use crate::editor::delays::{merge_delays, split_delays};
use crate::editor::{EditorGroup, EditorOperation, EditorOperator};
use crate::error::Result;
use crate::maa::{ActionsField, CURRENT_VERSION, Group, Operation};
use crate::rounds::mapper::{
    MapperOptions, round_actions_to_editor_actions, slot_assignments_from_opers,
};
use crate::schema;
use crate::siming::reader::siming_graph_to_round_actions;
use crate::siming::{ActionDelays, CONFIG_KEY, SimingGraph};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub use migrate::migrate_operation;

/// Older documents may keep the graph in this field
const SIMING_FIELD: &str = "siming_actions";
/// Legacy stage name field
const LEGACY_LEVEL_FIELD: &str = "level";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOptions {
    /// Used when editor actions are derived from a graph
    pub mapper: MapperOptions,
    /// Delays for documents without a config node
    pub action_delays: ActionDelays,
}

/// Wire to editor (hydrate).
pub fn to_editor_operation(wire: &Operation) -> EditorOperation {
    to_editor_operation_with(wire, &ReconcileOptions::default())
}

pub fn to_editor_operation_with(wire: &Operation, options: &ReconcileOptions) -> EditorOperation {
    let mut wire = wire.clone();
    migrate_operation(&mut wire);

    let (flat, mut graph) = match std::mem::take(&mut wire.actions) {
        ActionsField::Flat(actions) => (actions, None),
        ActionsField::Graph(graph) => (Vec::new(), Some(graph)),
    };
    if let Some(stored) = wire.extra.remove(SIMING_FIELD) {
        match serde_json::from_value::<SimingGraph>(stored) {
            Ok(stored) if graph.is_none() => graph = Some(stored),
            Ok(_) => warn!(
                "Document carries both a graph in actions and siming_actions, keeping actions"
            ),
            Err(e) => warn!(error = %e, "Ignoring malformed siming_actions field"),
        }
    }
    let graph = graph.filter(|g| !g.is_empty());

    let mut actions = split_delays(&flat);

    if actions.is_empty() {
        if let Some(graph) = &graph {
            let model = siming_graph_to_round_actions(graph);
            let mut mapper = options.mapper.clone();
            if mapper.slot_assignments.is_empty() {
                mapper.slot_assignments =
                    slot_assignments_from_opers(wire.opers.iter().map(|o| o.name.as_str()));
            }
            actions = round_actions_to_editor_actions(&model, &mapper);
            info!(
                nodes = graph.len(),
                actions = actions.len(),
                "Derived editor actions from graph-only document"
            );
        }
    }

    if wire.stage_name.is_empty() {
        if let Some(level) = legacy_stage_name(&wire.extra) {
            debug!(stage = %level, "Backfilled stage_name from legacy level field");
            wire.stage_name = level;
        }
    }

    let action_delays = graph
        .as_ref()
        .and_then(ActionDelays::from_graph)
        .unwrap_or(options.action_delays);

    let mut editor = EditorOperation {
        version: wire.version,
        minimum_required: wire.minimum_required,
        stage_name: wire.stage_name,
        difficulty: wire.difficulty,
        doc: wire.doc,
        opers: wire.opers.iter().map(EditorOperator::from_wire).collect(),
        groups: wire
            .groups
            .iter()
            .map(|group| EditorGroup {
                id: String::new(),
                name: group.name.clone(),
                opers: group.opers.iter().map(EditorOperator::from_wire).collect(),
                extra: group.extra.clone(),
            })
            .collect(),
        actions,
        siming_actions: graph,
        action_delays,
        extra: wire.extra,
    };
    editor.hydrate();
    editor
}

fn legacy_stage_name(extra: &serde_json::Map<String, Value>) -> Option<String> {
    let level = extra.get(LEGACY_LEVEL_FIELD)?;
    let name = match level {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj
            .get("stage_id")
            .or_else(|| obj.get("stageId"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Editor to wire (dehydrate).
pub fn to_maa_operation(editor: &EditorOperation) -> Operation {
    let opers = editor.opers.iter().map(EditorOperator::to_wire).collect();
    let groups = editor
        .groups
        .iter()
        .map(|group| Group {
            name: group.name.clone(),
            opers: group.opers.iter().map(EditorOperator::to_wire).collect(),
            extra: group.extra.clone(),
        })
        .collect();

    let actions = match &editor.siming_actions {
        Some(graph) if editor.actions.is_empty() => {
            ActionsField::Graph(with_delays(graph, &editor.action_delays))
        }
        _ => ActionsField::Flat(merge_delays(&editor.actions)),
    };

    let mut wire = Operation {
        version: editor.version,
        minimum_required: editor.minimum_required.clone(),
        stage_name: editor.stage_name.clone(),
        difficulty: editor.difficulty,
        doc: editor.doc.clone(),
        opers,
        groups,
        actions,
        extra: editor.extra.clone(),
    };

    if wire.version.is_none() && wire.all_operators().any(|o| o.has_requirements()) {
        debug!(version = CURRENT_VERSION, "Operator requirements present, setting version");
        wire.version = Some(CURRENT_VERSION);
    }
    wire
}

/// Writes the editor delays back into the config node, touching only the three delay keys.
fn with_delays(graph: &SimingGraph, delays: &ActionDelays) -> SimingGraph {
    let mut graph = graph.clone();
    match graph.get_mut(CONFIG_KEY) {
        Some(node) => {
            node.extra.insert("attack_delay".to_string(), json!(delays.attack));
            node.extra.insert("ultimate_delay".to_string(), json!(delays.ultimate));
            node.extra.insert("defense_delay".to_string(), json!(delays.defense));
        }
        None if *delays != ActionDelays::default() => {
            graph.insert(CONFIG_KEY.to_string(), delays.config_node());
        }
        None => {}
    }
    graph
}

pub fn hydrate_json(raw: &str) -> Result<EditorOperation> {
    let wire = schema::parse_loose(raw)?;
    Ok(to_editor_operation(&wire))
}

pub fn dehydrate_json(editor: &EditorOperation) -> Result<String> {
    Ok(to_maa_operation(editor).to_json_string()?)
}
