//! Command dispatch and handler modules.

mod csv_to_json;
mod filter_universe;
mod solve;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Solve {
            run_list,
            universe,
            env_constraints,
            timeout,
            dry_run,
        } => solve::exec(&run_list, universe, env_constraints, timeout, dry_run),
        Command::FilterUniverse {
            universe,
            env_constraints,
            output_dir,
        } => filter_universe::exec(&universe, &env_constraints, output_dir),
        Command::CsvToJson { file } => csv_to_json::exec(&file),
    }
}
