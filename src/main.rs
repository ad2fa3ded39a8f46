// This is the main file of metasm and where execution starts. It handles the CLI and then hands
// over to the launcher.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use clap::{Arg, ArgAction, Command, CommandFactory, FromArgMatches, Parser, crate_version};
use std::ffi::OsString;
use std::path::PathBuf;

mod config;
mod engine;
mod input;
mod launch;
mod log;
mod misc;
mod resources;
mod samplesheet;


use crate::config::{ExecutionMode, RunRequest};
use crate::misc::{absolute_path, default_threads};


#[derive(Parser)]
#[command(name = "metasm",
          version = concat!("v", crate_version!()),
          about = "a launcher for assembling scaffolds from (viral) metagenomics samples",
          long_about = None)]
#[clap(arg_required_else_help = true)]
struct Cli {
    /// The input directory containing the raw fastq(.gz) files (required)
    #[clap(short = 'i', long = "input", value_name = "DIR", required = true)]
    input: PathBuf,

    /// Output directory (required)
    #[clap(short = 'o', long = "output", value_name = "DIR", required = true)]
    output: PathBuf,

    /// Skip the update check
    #[clap(long = "skip-updates")]
    skip_updates: bool,

    /// Run the workflow on this machine instead of submitting jobs to a grid
    #[clap(long = "local")]
    local: bool,

    /// Override the default human genome background file
    #[clap(long = "background", value_name = "FILE")]
    background: Option<PathBuf>,

    /// Check that the workflow would run as expected, without actually running it
    #[clap(long = "dryrun")]
    dryrun: bool,

    /// Number of local threads that are available to use
    #[clap(long = "threads", value_name = "N", default_value_t = default_threads())]
    threads: usize,
}


// clap's own version flag is -V, so it is swapped for one that also answers to -v.
fn cli_command() -> Command {
    Cli::command()
        .disable_version_flag(true)
        .arg(Arg::new("version")
             .short('v')
             .long("version")
             .action(ArgAction::Version)
             .help("Show the metasm version and exit"))
}


fn parse_cli<I, T>(args: I) -> Result<Cli, clap::Error>
        where I: IntoIterator<Item = T>, T: Into<OsString> + Clone {
    let matches = cli_command().try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}


fn main() {
    let cli = parse_cli(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let request = RunRequest {
        input_dir: absolute_path(&cli.input),
        output_dir: absolute_path(&cli.output),
        threads: cli.threads,
        mode: ExecutionMode::from_local_flag(cli.local),
        background: cli.background,
        dryrun: cli.dryrun,
    };
    if !launch::run(request, cli.skip_updates) {
        std::process::exit(1);
    }
}


#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_definition() {
        cli_command().debug_assert();
    }

    #[test]
    fn test_cli_version_flags() {
        for flag in ["-v", "--version"] {
            let err = parse_cli(["metasm", flag]).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
            assert!(err.to_string().contains(crate_version!()));
        }
        assert_eq!(parse_cli(["metasm", "-V"]).err().unwrap().kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse_cli(["metasm", "--input", "in", "--output", "out"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("in"));
        assert_eq!(cli.output, PathBuf::from("out"));
        assert_eq!(cli.threads, default_threads());
        assert!(!cli.local);
        assert!(!cli.dryrun);
        assert!(!cli.skip_updates);
        assert!(cli.background.is_none());
    }

    #[test]
    fn test_cli_all_options() {
        let cli = parse_cli(["metasm", "-i", "in", "-o", "out", "--local", "--dryrun",
                                       "--skip-updates", "--background", "bg.fasta",
                                       "--threads", "8"]).unwrap();
        assert!(cli.local);
        assert!(cli.dryrun);
        assert!(cli.skip_updates);
        assert_eq!(cli.background, Some(PathBuf::from("bg.fasta")));
        assert_eq!(cli.threads, 8);
    }

    #[test]
    fn test_cli_missing_required() {
        assert!(parse_cli(["metasm"]).is_err());
        assert!(parse_cli(["metasm", "--input", "in"]).is_err());
        assert!(parse_cli(["metasm", "--output", "out"]).is_err());
        assert!(parse_cli(["metasm", "-i", "in", "-o", "out", "--threads", "x"]).is_err());
    }
}
