use clap::Args;
use serde::Serialize;

use recurve::backup::{BackupPolicy, FsBackupStore};
use recurve::binding::{ChangeRecord, OperationResult};
use recurve::changeset::RenameMode;
use recurve::clip::{self, Clip, CurveHost};
use recurve::session::{Session, SessionOptions};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct RenameArgs {
    /// Name to rename from
    #[arg(long)]
    from: String,

    /// Name to rename to
    #[arg(long)]
    to: String,

    /// Rename target: object path or blend-shape property
    #[arg(long, default_value = "object")]
    mode: String,

    /// Case-insensitive matching (replaces the first occurrence only)
    #[arg(long)]
    ignore_case: bool,

    /// Skip Unicode NFC normalization before matching
    #[arg(long)]
    no_normalize: bool,

    /// Apply changes to disk (default is preview)
    #[arg(long)]
    write: bool,

    /// Backup policy for clip files: none, keep, temporary
    #[arg(long, default_value = "keep")]
    backup: String,

    /// Clip JSON files to rename in
    #[arg(required = true)]
    clips: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RenameOutput {
    #[serde(rename = "rename")]
    #[serde(rename_all = "camelCase")]
    Rename {
        mode: String,
        from: String,
        to: String,
        dry_run: bool,
        matched: usize,
        changes: Vec<ChangeRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<OperationResult>,
    },
}

pub fn run(args: RenameArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RenameOutput> {
    let mode = RenameMode::from_str(&args.mode)?;
    let policy = BackupPolicy::from_str(&args.backup)?;
    let clips = clip::load_all(&args.clips)?;

    let mut session: Session<Clip> = Session::new(
        clips,
        SessionOptions {
            case_sensitive: !args.ignore_case,
            normalize_unicode: !args.no_normalize,
        },
    );
    session.set_mode(mode);

    let changes = session.preview_rename(&args.from, &args.to)?.to_vec();
    let matched = changes.len();

    let result = if args.write && matched > 0 {
        let mut store = FsBackupStore;
        let result = session.apply_changes(policy, &mut store)?;
        save_modified(session.owners_mut())?;
        Some(result)
    } else {
        None
    };

    let exit_code = if matched == 0 { 1 } else { 0 };

    Ok((
        RenameOutput::Rename {
            mode: mode.as_str().to_string(),
            from: args.from,
            to: args.to,
            dry_run: !args.write,
            matched,
            changes,
            result,
        },
        exit_code,
    ))
}

/// Flush owners an apply touched back to their source files.
pub(crate) fn save_modified(owners: &mut [Clip]) -> recurve::Result<()> {
    for owner in owners {
        if owner.is_modified() {
            owner.save()?;
        }
    }
    Ok(())
}
