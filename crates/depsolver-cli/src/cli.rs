//! CLI argument definitions for depsolver.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depsolver",
    version,
    about = "Resolve Chef cookbook run lists against a local cookbook universe",
    long_about = "depsolver expands a run list, narrows a cookbook universe by environment \
                  constraints and searches for a consistent set of cookbook versions, \
                  preferring the newest versions, within a time limit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a run list and print a JSON report
    Solve {
        /// Run list items, e.g. `nginx`, `nginx::ssl@1.2.0`, `recipe[apt]`.
        /// Items may also be comma separated.
        run_list: Vec<String>,
        /// Cookbook universe JSON file
        #[arg(short, long)]
        universe: PathBuf,
        /// Environment constraints JSON file
        #[arg(short, long)]
        env_constraints: Option<PathBuf>,
        /// Search time limit in seconds (fractions allowed)
        #[arg(short, long)]
        timeout: Option<f64>,
        /// List the cookbooks the run list can reach instead of solving
        #[arg(long)]
        dry_run: bool,
    },

    /// Filter a universe by environment constraints and save it
    FilterUniverse {
        /// Cookbook universe JSON file
        #[arg(short, long)]
        universe: PathBuf,
        /// Environment constraints JSON file
        #[arg(short, long)]
        env_constraints: PathBuf,
        /// Directory to save the filtered universe in
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Convert a CSV universe export to universe JSON
    CsvToJson {
        /// CSV file with `name,version,updated_at,dependencies` lines
        file: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
