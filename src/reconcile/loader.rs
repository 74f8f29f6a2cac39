use crate::editor::EditorOperation;
use crate::maa::Operation;
use crate::reconcile::{to_editor_operation_with, ReconcileOptions};
use crate::schema::parse_loose;
use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::Path;

pub fn load_operation(file_path: impl AsRef<Path>) -> Result<Operation> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read operation file from {}", file_path.display()))?;

    let operation = parse_loose(&content)
        .with_context(|| format!("Failed to parse operation from {}", file_path.display()))?;

    Ok(operation)
}

pub fn load_editor_operation(
    file_path: impl AsRef<Path>,
    options: &ReconcileOptions,
) -> Result<EditorOperation> {
    let operation = load_operation(file_path)?;
    Ok(to_editor_operation_with(&operation, options))
}

/// Editor JSON (camelCase) file
pub fn load_editor_json(file_path: impl AsRef<Path>) -> Result<EditorOperation> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read editor file from {}", file_path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from {}", file_path.display()))?;

    EditorOperation::from_json(value)
        .with_context(|| format!("Failed to read editor operation from {}", file_path.display()))
}

pub fn save_operation(operation: &Operation, file_path: impl AsRef<Path>) -> Result<()> {
    let file_path = file_path.as_ref();
    let content = operation
        .to_json_string()
        .context("Failed to serialize operation")?;

    fs::write(file_path, content)
        .with_context(|| format!("Failed to write operation file to {}", file_path.display()))?;

    Ok(())
}
