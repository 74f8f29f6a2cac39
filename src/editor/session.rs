//! An editing session: the current operation plus its undo log.
//!
//! Every edit goes through [`EditorSession::apply`]. A failed import leaves
//! the state alone, and submitting reads a snapshot without touching history.

use crate::config::Config;
use crate::editor::EditorOperation;
use crate::editor::history::{Checkpoint, DEFAULT_HISTORY_LIMIT, History};
use crate::error::{Issue, Result};
use crate::maa::Operation;
use crate::reconcile::{ReconcileOptions, to_editor_operation_with, to_maa_operation};
use crate::rounds::import::parse_round_import;
use crate::schema::{parse_loose, validate};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub operation: Operation,
    pub issues: Vec<Issue>,
}

impl Submission {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct EditorSession {
    history: History<EditorOperation>,
    options: ReconcileOptions,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, ReconcileOptions::default())
    }
}

impl EditorSession {
    pub fn new(history_limit: usize, options: ReconcileOptions) -> Self {
        Self {
            history: History::new(
                Checkpoint::new(EditorOperation::template(), "新建作业"),
                history_limit,
            ),
            options,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.history_limit, config.reconcile_options())
    }

    pub fn operation(&self) -> &EditorOperation {
        self.history.state()
    }

    pub fn history(&self) -> &History<EditorOperation> {
        &self.history
    }

    /// Loads wire JSON. On error the session is unchanged.
    pub fn import_json(&mut self, raw: &str) -> Result<()> {
        let wire = parse_loose(raw)?;
        let editor = to_editor_operation_with(&wire, &self.options);
        info!(
            stage = %editor.stage_name,
            actions = editor.actions.len(),
            "Loaded operation into editor"
        );
        self.history.reset(Checkpoint::new(editor, "导入作业"));
        Ok(())
    }

    /// Replaces operators and actions with a pasted round action import.
    pub fn import_rounds(&mut self, raw: &str) -> Result<()> {
        let import = parse_round_import(raw)?;
        let generated = import.into_editor_operation(&self.options.mapper);
        self.apply("导入回合动作", None, move |op| {
            op.opers = generated.opers;
            op.actions = generated.actions;
        });
        Ok(())
    }

    /// Runs `edit` on a copy of the current state and records it, unless nothing changed.
    pub fn apply<F>(&mut self, label: &str, squash_key: Option<&str>, edit: F) -> bool
    where
        F: FnOnce(&mut EditorOperation),
    {
        self.history.commit(|current| {
            let mut next = current.clone();
            edit(&mut next);
            let mut checkpoint = Checkpoint::new(next, label);
            if let Some(key) = squash_key {
                checkpoint = checkpoint.squash(key);
            }
            Some(checkpoint)
        })
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    /// Wire JSON for the live preview
    pub fn wire_preview(&self) -> Result<Value> {
        Ok(serde_json::to_value(to_maa_operation(self.operation()))?)
    }

    pub fn submission(&self) -> Submission {
        let operation = to_maa_operation(self.operation());
        let issues = validate(&operation);
        Submission { operation, issues }
    }
}
