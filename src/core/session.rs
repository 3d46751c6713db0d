//! Owned preview/discovery state with defined reset points.
//!
//! Upstream surfaces (CLI today, an editor panel originally) hold exactly one
//! `Session`. Discovered names and pending records live here and are cleared
//! at three points: a mode switch, an owner-list change, and a successful
//! apply. Stale previews can therefore never be applied against a different
//! mode or owner set.

use std::collections::BTreeSet;

use crate::core::backup::{BackupPolicy, BackupStore};
use crate::core::binding::{ChangeRecord, CleanupRecord, OperationResult};
use crate::core::changeset::{self, RenameMode, RenameRequest};
use crate::core::cleanup::{self, CleanupMode, CleanupOptions};
use crate::core::clip::CurveHost;
use crate::core::discover;
use crate::core::error::Result;
use crate::core::executor::{EnginePhase, TransactionExecutor};
use crate::core::text::TextMatcher;

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub case_sensitive: bool,
    pub normalize_unicode: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            normalize_unicode: true,
        }
    }
}

pub struct Session<H: CurveHost> {
    options: SessionOptions,
    mode: RenameMode,
    owners: Vec<H>,
    discovered: BTreeSet<String>,
    changes: Vec<ChangeRecord>,
    cleanups: Vec<CleanupRecord>,
    executor: TransactionExecutor,
}

impl<H: CurveHost> Session<H> {
    pub fn new(owners: Vec<H>, options: SessionOptions) -> Self {
        Self {
            options,
            mode: RenameMode::Object,
            owners,
            discovered: BTreeSet::new(),
            changes: Vec::new(),
            cleanups: Vec::new(),
            executor: TransactionExecutor::new(),
        }
    }

    pub fn matcher(&self) -> TextMatcher {
        TextMatcher::new(self.options.normalize_unicode)
    }

    pub fn mode(&self) -> RenameMode {
        self.mode
    }

    pub fn phase(&self) -> EnginePhase {
        self.executor.phase()
    }

    pub fn owners(&self) -> &[H] {
        &self.owners
    }

    pub fn owners_mut(&mut self) -> &mut [H] {
        &mut self.owners
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    pub fn cleanups(&self) -> &[CleanupRecord] {
        &self.cleanups
    }

    /// Reset point: switching mode clears pending records.
    pub fn set_mode(&mut self, mode: RenameMode) {
        if self.mode != mode {
            self.mode = mode;
            self.clear_records();
        }
    }

    /// Reset point: replacing the owner list clears discovery and records.
    pub fn set_owners(&mut self, owners: Vec<H>) {
        self.owners = owners;
        self.discovered.clear();
        self.clear_records();
    }

    fn clear_records(&mut self) {
        self.changes.clear();
        self.cleanups.clear();
    }

    /// Scan all owners for candidate names under the current mode.
    pub fn discover(&mut self) -> Result<&BTreeSet<String>> {
        let _guard = self.executor.begin(EnginePhase::Scanning)?;
        self.discovered = discover::discover(&self.owners, self.mode);
        drop(_guard);
        Ok(&self.discovered)
    }

    /// Build a rename preview; replaces any previous pending records.
    pub fn preview_rename(&mut self, from: &str, to: &str) -> Result<&[ChangeRecord]> {
        let matcher = self.matcher();
        let request = RenameRequest {
            mode: self.mode,
            from: from.to_string(),
            to: to.to_string(),
            case_sensitive: self.options.case_sensitive,
        };

        let _guard = self.executor.begin(EnginePhase::Previewing)?;
        let records = changeset::preview(&self.owners, &request, &matcher)?;
        drop(_guard);

        self.cleanups.clear();
        self.changes = records;
        Ok(&self.changes)
    }

    /// Build a cleanup preview; replaces any previous pending records.
    pub fn preview_cleanup(
        &mut self,
        mode: CleanupMode,
        opts: &CleanupOptions,
    ) -> Result<&[CleanupRecord]> {
        let _guard = self.executor.begin(EnginePhase::Previewing)?;
        let records = cleanup::preview_cleanup(&self.owners, mode, opts);
        drop(_guard);

        self.changes.clear();
        self.cleanups = records;
        Ok(&self.cleanups)
    }

    /// Apply the pending rename records. Reset point: records clear on
    /// success so the stale preview cannot run twice.
    pub fn apply_changes(
        &mut self,
        policy: BackupPolicy,
        store: &mut dyn BackupStore,
    ) -> Result<OperationResult> {
        let result = self
            .executor
            .apply_changes(&mut self.owners, &self.changes, policy, store)?;
        self.changes.clear();
        Ok(result)
    }

    /// Apply the pending cleanup records; records clear on success.
    pub fn apply_cleanup(
        &mut self,
        policy: BackupPolicy,
        store: &mut dyn BackupStore,
    ) -> Result<OperationResult> {
        let result = self
            .executor
            .apply_cleanup(&mut self.owners, &self.cleanups, policy, store)?;
        self.cleanups.clear();
        Ok(result)
    }
}
