use crate::maa::{CURRENT_VERSION, ModuleKind, Operation};
use tracing::{info, warn};

/// Version 2 module index to module
pub const LEGACY_MODULE_TABLE: [ModuleKind; 5] = [
    ModuleKind::Original,
    ModuleKind::X,
    ModuleKind::Y,
    ModuleKind::Alpha,
    ModuleKind::Delta,
];

pub fn legacy_module(index: i32) -> Option<ModuleKind> {
    usize::try_from(index)
        .ok()
        .and_then(|i| LEGACY_MODULE_TABLE.get(i).copied())
}

/// Migrates in place and returns whether anything changed.
///
/// Only version 2 is migrated. Other versions pass through.
pub fn migrate_operation(operation: &mut Operation) -> bool {
    if operation.version != Some(2) {
        return false;
    }

    let mut remapped = 0usize;
    for oper in operation.all_operators_mut() {
        let Some(requirements) = oper.requirements.as_mut() else {
            continue;
        };
        let Some(index) = requirements.module else {
            continue;
        };
        match legacy_module(index) {
            Some(module) => {
                requirements.module = Some(module.code());
                remapped += 1;
            }
            None => warn!(
                oper = %oper.name,
                index,
                "Legacy module index has no mapping, kept as is"
            ),
        }
    }

    operation.version = Some(CURRENT_VERSION);
    info!(remapped, to = CURRENT_VERSION, "Migrated version 2 operation");
    true
}
