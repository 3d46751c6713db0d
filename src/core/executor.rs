//! Transactional apply over a batch of owners.
//!
//! Mutations are grouped per owner. Failures isolate: a failed record does
//! not abort its siblings, a failed owner does not abort the other owners.
//! The worst case is a partially-applied batch, fully reported through the
//! returned [`OperationResult`] and recoverable from the backups.

use std::time::Instant;

use serde::Serialize;

use crate::core::backup::{create_backup, BackupPolicy, BackupStore};
use crate::core::binding::{ChangeRecord, CleanupRecord, Curve, CurveBinding, OperationResult};
use crate::core::clip::CurveHost;
use crate::core::error::{Error, Result};

/// Engine lifecycle. Transitions only between `Idle` and one active phase;
/// a second operation is rejected while one is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    Idle,
    Scanning,
    Previewing,
    Processing,
}

impl EnginePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnginePhase::Idle => "Idle",
            EnginePhase::Scanning => "Scanning",
            EnginePhase::Previewing => "Previewing",
            EnginePhase::Processing => "Processing",
        }
    }
}

/// Single-operation gate. At most one scan/preview/apply is active
/// system-wide; re-entrant calls get an `operation_in_progress` error.
#[derive(Debug)]
pub struct OperationGate {
    phase: EnginePhase,
}

impl Default for OperationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationGate {
    pub fn new() -> Self {
        Self {
            phase: EnginePhase::Idle,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Enter `requested` from `Idle`. The returned guard restores `Idle`
    /// when dropped, so early returns cannot wedge the gate.
    pub fn begin(&mut self, requested: EnginePhase) -> Result<PhaseGuard<'_>> {
        if requested == EnginePhase::Idle {
            return Err(Error::other("Cannot begin the Idle phase"));
        }
        if self.phase != EnginePhase::Idle {
            return Err(Error::operation_in_progress(
                self.phase.as_str(),
                requested.as_str(),
            ));
        }
        self.phase = requested;
        Ok(PhaseGuard { gate: self })
    }
}

#[derive(Debug)]
pub struct PhaseGuard<'a> {
    gate: &'a mut OperationGate,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.gate.phase = EnginePhase::Idle;
    }
}

/// One accepted mutation: remove a binding, optionally insert its
/// replacement carrying the original keyframes.
#[derive(Debug, Clone)]
pub struct PlannedMutation {
    pub owner_id: String,
    pub remove: CurveBinding,
    pub insert: Option<(CurveBinding, Curve)>,
    /// Warning carried from validation, surfaced in the result.
    pub note: Option<String>,
}

/// Accepted rename records: errors are excluded, warnings are included and
/// flagged, no-op records are skipped.
pub fn plan_changes(records: &[ChangeRecord]) -> Vec<PlannedMutation> {
    records
        .iter()
        .filter(|r| r.will_change())
        .map(|r| PlannedMutation {
            owner_id: r.owner_id.clone(),
            remove: r.binding.clone(),
            insert: Some((r.new_binding(), r.new_curve.clone())),
            note: r.validation.message.clone(),
        })
        .collect()
}

/// Accepted cleanup records. Preservation warnings are filtered out here,
/// at apply acceptance, having stayed visible through the preview.
pub fn plan_cleanup(records: &[CleanupRecord]) -> Vec<PlannedMutation> {
    records
        .iter()
        .filter(|r| r.accepted())
        .map(|r| PlannedMutation {
            owner_id: r.owner_id.clone(),
            remove: r.binding.clone(),
            insert: None,
            note: None,
        })
        .collect()
}

/// The executor component: the gate plus the apply algorithm.
#[derive(Debug, Default)]
pub struct TransactionExecutor {
    gate: OperationGate,
}

impl TransactionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EnginePhase {
        self.gate.phase()
    }

    /// Enter a non-apply phase (scan/preview) under the same gate.
    pub fn begin(&mut self, phase: EnginePhase) -> Result<PhaseGuard<'_>> {
        self.gate.begin(phase)
    }

    pub fn apply_changes<H: CurveHost>(
        &mut self,
        owners: &mut [H],
        records: &[ChangeRecord],
        policy: BackupPolicy,
        store: &mut dyn BackupStore,
    ) -> Result<OperationResult> {
        let _guard = self.gate.begin(EnginePhase::Processing)?;
        Ok(apply(
            owners,
            &plan_changes(records),
            policy,
            store,
            "Rename curve bindings",
        ))
    }

    pub fn apply_cleanup<H: CurveHost>(
        &mut self,
        owners: &mut [H],
        records: &[CleanupRecord],
        policy: BackupPolicy,
        store: &mut dyn BackupStore,
    ) -> Result<OperationResult> {
        let _guard = self.gate.begin(EnginePhase::Processing)?;
        Ok(apply(
            owners,
            &plan_cleanup(records),
            policy,
            store,
            "Remove curve bindings",
        ))
    }
}

/// Apply planned mutations grouped by owner. See the module docs for the
/// failure-isolation contract.
pub fn apply<H: CurveHost>(
    owners: &mut [H],
    mutations: &[PlannedMutation],
    policy: BackupPolicy,
    store: &mut dyn BackupStore,
    undo_label: &str,
) -> OperationResult {
    let started = Instant::now();
    let mut result = OperationResult {
        total: mutations.len(),
        ..OperationResult::default()
    };

    let mut created_backups = Vec::new();
    let mut owner_errors = 0usize;

    for (owner_id, group) in group_by_owner(mutations) {
        let Some(owner) = owners.iter_mut().find(|o| o.id() == owner_id) else {
            owner_errors += 1;
            result.errors += 1;
            result.push_message(format!("Owner not in batch: {}", owner_id));
            continue;
        };

        if policy != BackupPolicy::None {
            match create_backup(owner, store) {
                Some(path) => created_backups.push(path),
                None => {
                    if owner.source_path().is_some() {
                        result.warnings += 1;
                        result.push_message(format!("Backup failed for {}", owner_id));
                    }
                }
            }
        }

        owner.begin_undo_group(undo_label);

        let mut applied = 0usize;
        for mutation in group {
            if let Some(note) = &mutation.note {
                result.warnings += 1;
                result.push_message(format!("{}: {}", mutation.remove.display(), note));
            }

            match swap_binding(owner, mutation) {
                Ok(()) => {
                    result.succeeded += 1;
                    applied += 1;
                }
                Err(e) => {
                    result.errors += 1;
                    result.push_message(format!("{}: {}", mutation.remove.display(), e.message));
                }
            }
        }

        owner.mark_modified();
        log_status!("apply", "{}: {} record(s)", owner_id, applied);
    }

    if policy == BackupPolicy::Temporary && owner_errors == 0 {
        for path in &created_backups {
            store.delete_asset(path);
        }
    }

    result.elapsed_ms = started.elapsed().as_millis() as u64;
    result
}

fn swap_binding<H: CurveHost>(owner: &mut H, mutation: &PlannedMutation) -> Result<()> {
    owner.set_curve(&mutation.remove, None)?;
    if let Some((binding, curve)) = &mutation.insert {
        owner.set_curve(binding, Some(curve.clone()))?;
    }
    Ok(())
}

/// Group mutations by owner id, preserving first-seen owner order.
fn group_by_owner(mutations: &[PlannedMutation]) -> Vec<(String, Vec<&PlannedMutation>)> {
    let mut groups: Vec<(String, Vec<&PlannedMutation>)> = Vec::new();

    for mutation in mutations {
        match groups.iter_mut().find(|(id, _)| *id == mutation.owner_id) {
            Some((_, group)) => group.push(mutation),
            None => groups.push((mutation.owner_id.clone(), vec![mutation])),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backup::FsBackupStore;
    use crate::core::binding::{Keyframe, Validation};
    use crate::core::clip::{BindingEntry, Clip};

    fn clip(name: &str, bindings: &[(&str, &str)]) -> Clip {
        Clip::in_memory(
            name,
            bindings
                .iter()
                .map(|(path, property)| BindingEntry {
                    binding: CurveBinding::new(*path, *property, "Transform"),
                    keys: vec![Keyframe { time: 0.0, value: 1.0 }],
                })
                .collect(),
        )
    }

    fn change(owner: &str, binding: CurveBinding, new_path: &str) -> ChangeRecord {
        let curve = Curve::new(vec![Keyframe { time: 0.0, value: 1.0 }]);
        ChangeRecord {
            owner_id: owner.to_string(),
            new_path: new_path.to_string(),
            new_property: binding.property.clone(),
            new_curve: curve,
            binding,
            validation: Validation::valid(),
        }
    }

    #[test]
    fn gate_restores_idle_on_drop() {
        let mut gate = OperationGate::new();
        {
            let _guard = gate.begin(EnginePhase::Scanning).unwrap();
        }
        assert_eq!(gate.phase(), EnginePhase::Idle);
        let _guard = gate.begin(EnginePhase::Processing).unwrap();
    }

    #[test]
    fn active_phase_rejects_second_operation() {
        let mut gate = OperationGate::new();
        let guard = gate.begin(EnginePhase::Previewing).unwrap();
        // Leak the guard so the phase stays active without holding a borrow.
        std::mem::forget(guard);

        let err = gate.begin(EnginePhase::Processing).unwrap_err();
        assert_eq!(
            err.code,
            crate::core::error::ErrorCode::OperationInProgress
        );
        assert_eq!(err.retryable, Some(true));
        assert_eq!(gate.phase(), EnginePhase::Previewing);
    }

    #[test]
    fn apply_empty_batch_returns_zeroed_result() {
        let mut owners = [clip("a", &[("Head", "rotation.x")])];
        let mut store = FsBackupStore;
        let result = apply(
            &mut owners,
            &[],
            BackupPolicy::Temporary,
            &mut store,
            "test",
        );
        assert_eq!(result.total, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.errors, 0);
        assert_eq!(result.warnings, 0);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn apply_renames_binding_and_keeps_keyframes() {
        let mut owners = [clip("a", &[("Head", "rotation.x")])];
        let binding = owners[0].list_bindings()[0].clone();
        let records = vec![change("a", binding, "Skull")];

        let mut store = FsBackupStore;
        let result = apply(
            &mut owners,
            &plan_changes(&records),
            BackupPolicy::None,
            &mut store,
            "test",
        );

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.errors, 0);

        let bindings = owners[0].list_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].path, "Skull");
        let curve = owners[0].curve(&bindings[0]).unwrap();
        assert_eq!(curve.keys, vec![Keyframe { time: 0.0, value: 1.0 }]);
        assert!(owners[0].is_modified());
        assert_eq!(owners[0].undo_labels(), ["test"]);
    }

    #[test]
    fn error_records_are_excluded_from_plan() {
        let binding = CurveBinding::new("Head", "rotation.x", "Transform");
        let mut record = change("a", binding, "Skull");
        record.validation = Validation::error("nope");
        assert!(plan_changes(&[record]).is_empty());
    }

    #[test]
    fn noop_records_are_excluded_from_plan() {
        let binding = CurveBinding::new("Head", "rotation.x", "Transform");
        let record = change("a", binding, "Head");
        assert!(plan_changes(&[record]).is_empty());
    }

    #[test]
    fn missing_owner_counts_one_error_and_other_owners_proceed() {
        let mut owners = [clip("a", &[("Head", "rotation.x")])];
        let present = owners[0].list_bindings()[0].clone();
        let absent = CurveBinding::new("Tail", "rotation.x", "Transform");
        let records = vec![change("ghost", absent, "X"), change("a", present, "Skull")];

        let mut store = FsBackupStore;
        let result = apply(
            &mut owners,
            &plan_changes(&records),
            BackupPolicy::None,
            &mut store,
            "test",
        );

        assert_eq!(result.errors, 1);
        assert_eq!(result.succeeded, 1);
        assert_eq!(owners[0].list_bindings()[0].path, "Skull");
    }

    #[test]
    fn colliding_records_leave_at_most_one_binding() {
        // Two accepted records converge on the same target identity; both
        // apply without failing and one binding survives.
        let mut owners = [clip("a", &[("Head", "rotation.x"), ("Cranium", "rotation.x")])];
        let bindings = owners[0].list_bindings();
        let records = vec![
            change("a", bindings[0].clone(), "Skull"),
            change("a", bindings[1].clone(), "Skull"),
        ];

        let mut store = FsBackupStore;
        let result = apply(
            &mut owners,
            &plan_changes(&records),
            BackupPolicy::None,
            &mut store,
            "test",
        );

        assert_eq!(result.errors, 0);
        let remaining = owners[0].list_bindings();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].path, "Skull");
    }

    #[test]
    fn warning_notes_are_counted_and_reported() {
        let mut owners = [clip("a", &[("Head", "rotation.x")])];
        let binding = owners[0].list_bindings()[0].clone();
        let mut record = change("a", binding, "Skull");
        record.validation = Validation::warning("binding already exists");

        let mut store = FsBackupStore;
        let result = apply(
            &mut owners,
            &plan_changes(&[record]),
            BackupPolicy::None,
            &mut store,
            "test",
        );

        assert_eq!(result.warnings, 1);
        assert_eq!(result.succeeded, 1);
        assert!(result.messages[0].contains("already exists"));
    }

    #[test]
    fn executor_gate_cycles_back_to_idle() {
        let mut executor = TransactionExecutor::new();
        let guard = executor.begin(EnginePhase::Scanning).unwrap();
        drop(guard);

        let mut owners = [clip("a", &[])];
        let mut store = FsBackupStore;
        let result = executor
            .apply_changes(&mut owners, &[], BackupPolicy::None, &mut store)
            .unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(executor.phase(), EnginePhase::Idle);
    }
}
