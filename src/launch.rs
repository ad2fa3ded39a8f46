// This file contains the code that prepares a pipeline run and then hands it to Snakemake: first
// to execute (or dry-run) the workflow and then, if that worked, to write a report.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{resolve, ExecutionMode, ResolvedConfig, RunRequest};
use crate::engine::{find_snakefile, ExecuteOptions, Invocation, Snakemake, Task, WorkflowEngine};
use crate::input::check_input_files;
use crate::log::{explanation, section_header, warning};
use crate::misc::{available_threads, check_if_dir_exists, check_if_dir_is_not_dir, create_dir,
                  format_duration, quit_with_error, spinner};
use crate::samplesheet::SampleSheet;


pub const CONDA_FRONTEND: &str = "mamba";
pub const RESTART_TIMES: u32 = 3;
pub const REPORT_PATH: &str = "results/snakemake_report.html";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Skipped,
    Written,
    Failed,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub success: bool,
    pub report: ReportOutcome,
}


/// Runs the whole launcher and returns whether the workflow succeeded.
pub fn run(request: RunRequest, skip_updates: bool) -> bool {
    let start_time = Instant::now();
    check_settings(&request);
    starting_message();
    print_settings(&request, skip_updates);
    let engine = Snakemake::from_env();
    let snakefile = find_snakefile();
    let outcome = prepare_and_launch(&request, &engine, &snakefile, available_threads());
    finished_message(start_time, &request, &outcome);
    outcome.success
}


fn check_settings(request: &RunRequest) {
    check_if_dir_exists(&request.input_dir);
    check_if_dir_is_not_dir(&request.output_dir);
    if request.threads < 1 {
        quit_with_error("--threads must be at least 1");
    }
}


fn starting_message() {
    section_header("Starting metasm");
    explanation("This command checks the input reads, writes the pipeline configuration and then \
                 runs the assembly workflow with Snakemake, either locally or on a grid.");
}


fn print_settings(request: &RunRequest, skip_updates: bool) {
    eprintln!("Settings:");
    eprintln!("  --input {}", request.input_dir.display());
    eprintln!("  --output {}", request.output_dir.display());
    eprintln!("  --threads {}", request.threads);
    if request.mode == ExecutionMode::Local {
        eprintln!("  --local");
    }
    if let Some(background) = &request.background {
        eprintln!("  --background {}", background.display());
    }
    if request.dryrun {
        eprintln!("  --dryrun");
    }
    if skip_updates {
        eprintln!("  --skip-updates");
    }
    eprintln!();
}


/// Everything after the command-line checks: validate input, write the sample sheet and config
/// files, then launch.
pub fn prepare_and_launch(request: &RunRequest, engine: &impl WorkflowEngine, snakefile: &Path,
                          available_cores: usize) -> LaunchOutcome {
    check_input(&request.input_dir);
    create_dir(&request.output_dir);
    let sample_sheet = write_sample_sheet(&request.input_dir, &request.output_dir);
    let config = resolve_config(&sample_sheet, request, available_cores);
    launch(engine, snakefile, &request.output_dir, &config)
}


fn check_input(input_dir: &Path) {
    section_header("Checking input");
    explanation("The input directory must contain at least one FASTQ file (.fastq, .fq, \
                 .fastq.gz or .fq.gz).");
    let found = check_input_files(input_dir).unwrap_or_else(|e| {
        quit_with_error(&format!("unable to read directory {}\n{}", input_dir.display(), e))
    });
    if !found {
        quit_with_error(&format!("{} does not contain any valid FASTQ files",
                                 input_dir.display()));
    }
    eprintln!("{} ({})", "Valid input files were found".green(), input_dir.display());
    eprintln!();
}


fn write_sample_sheet(input_dir: &Path, output_dir: &Path) -> PathBuf {
    section_header("Building sample sheet");
    explanation("Read files are now grouped into samples, pairing R1 and R2 files where present.");
    let sheet = SampleSheet::from_dir(input_dir).unwrap_or_else(|e| {
        quit_with_error(&format!("unable to build sample sheet for {}\n{}",
                                 input_dir.display(), e))
    });
    sheet.print_samples();
    let sheet_path = output_dir.join("samplesheet.yaml");
    if let Err(e) = sheet.save_to_yaml(&sheet_path) {
        quit_with_error(&format!("failed to write {}\n{}", sheet_path.display(), e));
    }
    sheet_path
}


fn resolve_config(sample_sheet: &Path, request: &RunRequest, available_cores: usize)
        -> ResolvedConfig {
    section_header("Writing configuration");
    explanation("Pipeline parameters and Snakemake settings are now written to the config \
                 directory in the output directory.");
    let config = resolve(sample_sheet, request, available_cores)
        .unwrap_or_else(|e| quit_with_error(&format!("failed to write configuration\n{}", e)));
    eprintln!("Execution: {}", request.mode.as_str());
    eprintln!("Cores: {}", config.settings.cores);
    if let Some(threads) = &config.params.threads {
        eprintln!("Threads per stage: Alignments {}, Filter {}, Assemble {}, MultiQC {}",
                  threads.alignments, threads.filter, threads.assemble, threads.multiqc);
    }
    eprintln!("Parameters: {}", config.params_path.display());
    eprintln!("Snakemake config: {}", config.config_path.display());
    eprintln!();
    config
}


/// Runs the workflow once and, unless it was a dry run or it failed, once more to write the
/// report. A failed report only produces a warning.
pub fn launch(engine: &impl WorkflowEngine, snakefile: &Path, workdir: &Path,
              config: &ResolvedConfig) -> LaunchOutcome {
    section_header(if config.settings.dryrun { "Dry-running workflow" } else { "Running workflow" });
    explanation("Snakemake now takes over. Failed jobs are restarted up to three times before \
                 the run is considered failed.");
    let success = engine.run(&execute_invocation(snakefile, workdir, config));
    if !success {
        eprintln!("{}", "Workflow failed".red());
        eprintln!();
        return LaunchOutcome { success, report: ReportOutcome::Skipped };
    }
    if config.settings.dryrun {
        return LaunchOutcome { success, report: ReportOutcome::Skipped };
    }

    section_header("Writing report");
    let pb = spinner("generating Snakemake report...");
    let written = engine.run(&report_invocation(snakefile, workdir, config));
    pb.finish_and_clear();
    let report = if written {
        ReportOutcome::Written
    } else {
        warning("failed to generate the Snakemake report");
        ReportOutcome::Failed
    };
    LaunchOutcome { success, report }
}


pub fn execute_invocation(snakefile: &Path, workdir: &Path, config: &ResolvedConfig) -> Invocation {
    let settings = &config.settings;
    let (nodes, drmaa) = match config.params.computing_execution {
        ExecutionMode::Local => (None, None),
        ExecutionMode::Grid => (Some(settings.cores), settings.grid.clone()),
    };
    Invocation {
        snakefile: snakefile.to_path_buf(),
        workdir: workdir.to_path_buf(),
        configfiles: vec![config.params_path.clone()],
        task: Task::Execute(ExecuteOptions {
            cores: settings.cores,
            nodes,
            conda_frontend: CONDA_FRONTEND.to_string(),
            use_conda: settings.use_conda,
            jobname: settings.jobname.clone(),
            latency_wait: settings.latency_wait,
            dryrun: settings.dryrun,
            restart_times: RESTART_TIMES,
            drmaa,
        }),
    }
}


pub fn report_invocation(snakefile: &Path, workdir: &Path, config: &ResolvedConfig) -> Invocation {
    Invocation {
        snakefile: snakefile.to_path_buf(),
        workdir: workdir.to_path_buf(),
        configfiles: vec![config.params_path.clone()],
        task: Task::Report { report: PathBuf::from(REPORT_PATH), quiet: true },
    }
}


fn finished_message(start_time: Instant, request: &RunRequest, outcome: &LaunchOutcome) {
    if outcome.success {
        section_header("Finished!");
    } else {
        section_header("Finished with errors");
    }
    eprintln!("Output directory: {}", request.output_dir.display());
    if outcome.report == ReportOutcome::Written {
        eprintln!("Report: {}", request.output_dir.join(REPORT_PATH).display());
    }
    eprintln!("Time to run: {}", format_duration(start_time.elapsed()));
    eprintln!();
}
