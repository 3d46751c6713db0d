use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{cleanup, discover, parse, rename, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "recurve")]
#[command(version = VERSION)]
#[command(about = "Batch rename and clean animation curve bindings in clip files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify raw binding path strings
    Parse(parse::ParseArgs),
    /// List object names or blend-shape channels found in clips
    Discover(discover::DiscoverArgs),
    /// Rename object paths or blend-shape properties across clips
    Rename(rename::RenameArgs),
    /// Remove empty or constant curves from clips
    Cleanup(cleanup::CleanupArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if let Err(err) = output::print_json_result(json_result) {
        // Reporting already failed; stderr is all that is left.
        eprintln!("{}", err.message);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
