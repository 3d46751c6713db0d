use clap::Args;
use serde::Serialize;

use recurve::changeset::RenameMode;
use recurve::clip;
use recurve::discover;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct DiscoverArgs {
    /// What to collect: object names or blend-shape property channels
    #[arg(long, default_value = "object")]
    mode: String,

    /// Clip JSON files to scan
    #[arg(required = true)]
    clips: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum DiscoverOutput {
    #[serde(rename = "discover")]
    #[serde(rename_all = "camelCase")]
    Discover {
        mode: String,
        clip_count: usize,
        names: Vec<String>,
    },
}

pub fn run(args: DiscoverArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<DiscoverOutput> {
    let mode = RenameMode::from_str(&args.mode)?;
    let clips = clip::load_all(&args.clips)?;

    let names: Vec<String> = discover::discover(&clips, mode).into_iter().collect();

    Ok((
        DiscoverOutput::Discover {
            mode: mode.as_str().to_string(),
            clip_count: clips.len(),
            names,
        },
        0,
    ))
}
