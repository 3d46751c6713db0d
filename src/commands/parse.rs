use clap::Args;
use serde::Serialize;

use recurve::parse::{self, ParsedPath};
use recurve::text::TextMatcher;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct ParseArgs {
    /// Raw binding path strings to classify
    #[arg(required = true)]
    paths: Vec<String>,

    /// Skip Unicode NFC normalization before matching
    #[arg(long)]
    no_normalize: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ParseOutput {
    #[serde(rename = "parse")]
    Parse { results: Vec<ParsedEntry> },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEntry {
    pub input: String,
    #[serde(flatten)]
    pub parsed: ParsedPath,
}

pub fn run(args: ParseArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ParseOutput> {
    let matcher = TextMatcher::new(!args.no_normalize);

    let results = args
        .paths
        .iter()
        .map(|raw| ParsedEntry {
            input: raw.clone(),
            parsed: parse::parse(raw, &matcher),
        })
        .collect();

    Ok((ParseOutput::Parse { results }, 0))
}
