pub type CmdResult<T> = recurve::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod cleanup;
pub mod discover;
pub mod parse;
pub mod rename;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (recurve::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Parse(args) => dispatch!(args, global, parse),
        crate::Commands::Discover(args) => dispatch!(args, global, discover),
        crate::Commands::Rename(args) => dispatch!(args, global, rename),
        crate::Commands::Cleanup(args) => dispatch!(args, global, cleanup),
    }
}
