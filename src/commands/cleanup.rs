use clap::Args;
use serde::Serialize;

use recurve::backup::{BackupPolicy, FsBackupStore};
use recurve::binding::{CleanupRecord, OperationResult};
use recurve::cleanup::{CleanupMode, CleanupOptions};
use recurve::clip::{self, Clip};
use recurve::session::{Session, SessionOptions};

use crate::commands::rename::save_modified;
use crate::commands::CmdResult;

#[derive(Args)]
pub struct CleanupArgs {
    /// Which curves qualify: empty, zero, both
    #[arg(long, default_value = "both")]
    mode: String,

    /// Magnitude at or below which a sample counts as zero/default
    #[arg(long, default_value_t = 0.001)]
    threshold: f32,

    /// Allow removal of blend-shape curves (preserved by default)
    #[arg(long)]
    include_blend_shapes: bool,

    /// Allow removal of transform curves (preserved by default)
    #[arg(long)]
    include_transforms: bool,

    /// Apply removals to disk (default is preview)
    #[arg(long)]
    write: bool,

    /// Backup policy for clip files: none, keep, temporary
    #[arg(long, default_value = "keep")]
    backup: String,

    /// Clip JSON files to clean
    #[arg(required = true)]
    clips: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum CleanupOutput {
    #[serde(rename = "cleanup")]
    #[serde(rename_all = "camelCase")]
    Cleanup {
        mode: String,
        dry_run: bool,
        removable: usize,
        preserved: usize,
        records: Vec<CleanupRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<OperationResult>,
    },
}

pub fn run(args: CleanupArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<CleanupOutput> {
    let mode = CleanupMode::from_str(&args.mode)?;
    let policy = BackupPolicy::from_str(&args.backup)?;
    let clips = clip::load_all(&args.clips)?;

    let opts = CleanupOptions {
        value_threshold: args.threshold,
        preserve_blend_shapes: !args.include_blend_shapes,
        preserve_transforms: !args.include_transforms,
    };

    let mut session: Session<Clip> = Session::new(clips, SessionOptions::default());
    let records = session.preview_cleanup(mode, &opts)?.to_vec();

    let removable = records.iter().filter(|r| r.accepted()).count();
    let preserved = records.len() - removable;

    let result = if args.write && removable > 0 {
        let mut store = FsBackupStore;
        let result = session.apply_cleanup(policy, &mut store)?;
        save_modified(session.owners_mut())?;
        Some(result)
    } else {
        None
    };

    let exit_code = if records.is_empty() { 1 } else { 0 };

    Ok((
        CleanupOutput::Cleanup {
            mode: args.mode,
            dry_run: !args.write,
            removable,
            preserved,
            records,
            result,
        },
        exit_code,
    ))
}
