// This file contains the interface to the workflow engine (Snakemake) which does the actual
// work of the pipeline.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::GridSettings;
use crate::misc::{check_if_file_exists, find_program, quit_with_error};


const SNAKEFILE_VAR: &str = "METASM_SNAKEFILE";
const SNAKEMAKE_VAR: &str = "METASM_SNAKEMAKE";


/// Anything that can run a workflow invocation and report whether it succeeded. Closures work
/// too, which is how the tests stand in for Snakemake.
pub trait WorkflowEngine {
    fn run(&self, invocation: &Invocation) -> bool;
}

impl<F: Fn(&Invocation) -> bool> WorkflowEngine for F {
    fn run(&self, invocation: &Invocation) -> bool {
        self(invocation)
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub snakefile: PathBuf,
    pub workdir: PathBuf,
    pub configfiles: Vec<PathBuf>,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Execute(ExecuteOptions),
    Report { report: PathBuf, quiet: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOptions {
    pub cores: usize,
    pub nodes: Option<usize>,
    pub conda_frontend: String,
    pub use_conda: bool,
    pub jobname: String,
    pub latency_wait: u32,
    pub dryrun: bool,
    pub restart_times: u32,
    pub drmaa: Option<GridSettings>,
}

impl Invocation {
    /// Snakemake command-line arguments for this invocation.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        args.push("--snakefile".into());
        args.push(self.snakefile.clone().into());
        args.push("--directory".into());
        args.push(self.workdir.clone().into());
        match &self.task {
            Task::Execute(opts) => {
                args.push("--cores".into());
                args.push(opts.cores.to_string().into());
                if let Some(nodes) = opts.nodes {
                    args.push("--nodes".into());
                    args.push(nodes.to_string().into());
                }
                args.push("--conda-frontend".into());
                args.push(opts.conda_frontend.clone().into());
                if opts.use_conda {
                    args.push("--use-conda".into());
                }
                args.push("--jobname".into());
                args.push(opts.jobname.clone().into());
                args.push("--latency-wait".into());
                args.push(opts.latency_wait.to_string().into());
                if let Some(grid) = &opts.drmaa {
                    // The native spec usually starts with a space or dash, so it must be glued
                    // to its flag.
                    args.push(format!("--drmaa={}", grid.drmaa).into());
                    args.push("--drmaa-log-dir".into());
                    args.push(grid.drmaa_log_dir.clone().into());
                }
                if opts.dryrun {
                    args.push("--dryrun".into());
                }
                args.push("--restart-times".into());
                args.push(opts.restart_times.to_string().into());
            }
            Task::Report { report, quiet } => {
                args.push("--report".into());
                args.push(report.clone().into());
                if *quiet {
                    args.push("--quiet".into());
                }
            }
        }
        args.push("--configfiles".into());
        args.extend(self.configfiles.iter().map(|f| f.clone().into_os_string()));
        args
    }

    #[cfg(test)]
    pub fn is_report(&self) -> bool {
        matches!(self.task, Task::Report { .. })
    }
}


/// Runs invocations by calling the snakemake executable and waiting for it to finish.
pub struct Snakemake {
    pub executable: PathBuf,
}

impl Snakemake {
    pub fn from_env() -> Self {
        let executable = match env::var_os(SNAKEMAKE_VAR) {
            Some(path) => PathBuf::from(path),
            None => find_program("snakemake"),
        };
        Snakemake { executable }
    }
}

impl WorkflowEngine for Snakemake {
    fn run(&self, invocation: &Invocation) -> bool {
        match Command::new(&self.executable).args(invocation.to_args()).status() {
            Ok(status) => status.success(),
            Err(e) => {
                eprintln!("failed to run {}\n{}", self.executable.display(), e);
                false
            }
        }
    }
}


/// The workflow definition comes from $METASM_SNAKEFILE if set, otherwise from a workflow
/// directory installed next to the executable.
pub fn find_snakefile() -> PathBuf {
    let snakefile = match env::var_os(SNAKEFILE_VAR) {
        Some(path) => PathBuf::from(path),
        None => default_snakefile(),
    };
    check_if_file_exists(&snakefile);
    snakefile
}


fn default_snakefile() -> PathBuf {
    let exe = env::current_exe().unwrap_or_else(|e| {
        quit_with_error(&format!("unable to locate the metasm executable\n{}", e))
    });
    let exe_dir = exe.parent().unwrap_or(Path::new("."));
    exe_dir.join("workflow").join("Snakefile")
}
