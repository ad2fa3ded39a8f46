// This file contains the code for building and writing the two configuration files used by the
// workflow: params.yaml (what the pipeline does) and config.yaml (how Snakemake runs it).

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, remove_file, rename, write};
use std::io;
use std::path::{Path, PathBuf};

use crate::resources::ResourceAllocation;


pub const DEFAULT_BACKGROUND: &str = "/mnt/db/metasm/background/GRCh38_latest_genomic.fna";
const JOB_NAME: &str = "metasm_{name}.jobid-{jobid}";
const LATENCY_WAIT: u32 = 60;
const GRID_CORES: usize = 300;
const DRMAA_SPEC: &str = " -q bio -n {threads} -R \"span[hosts=1]\"";
const DRMAA_LOG_DIR: &str = "logs/drmaa";


#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Local,  // everything runs on this machine
    Grid,   // jobs are submitted to a cluster through DRMAA
}

impl ExecutionMode {
    pub fn from_local_flag(local: bool) -> Self {
        if local { ExecutionMode::Local } else { ExecutionMode::Grid }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Local => "local",
            ExecutionMode::Grid => "grid",
        }
    }
}


/// Everything the user asked for on the command line.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub threads: usize,
    pub mode: ExecutionMode,
    pub background: Option<PathBuf>,
    pub dryrun: bool,
}


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Databases {
    pub background: PathBuf,
}


/// Per-stage thread counts, keyed by the rule names used in the workflow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageThreads {
    #[serde(rename = "Alignments")]
    pub alignments: usize,
    #[serde(rename = "Filter")]
    pub filter: usize,
    #[serde(rename = "Assemble")]
    pub assemble: usize,
    #[serde(rename = "MultiQC")]
    pub multiqc: usize,
}

impl From<&ResourceAllocation> for StageThreads {
    fn from(allocation: &ResourceAllocation) -> Self {
        StageThreads {
            alignments: allocation.high_cpu,
            filter: allocation.mid_cpu,
            assemble: allocation.high_cpu,
            multiqc: allocation.low_cpu,
        }
    }
}


/// Contents of params.yaml. Stage threads are only given for local runs: on the grid each rule
/// requests its own resources from the scheduler.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub sample_sheet: PathBuf,
    pub computing_execution: ExecutionMode,
    pub db: Databases,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<StageThreads>,
}


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GridSettings {
    pub drmaa: String,
    pub drmaa_log_dir: PathBuf,
}


/// Contents of config.yaml. The grid fields are flattened in, so a local config has no DRMAA
/// keys at all.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct EngineSettings {
    pub cores: usize,
    pub latency_wait: u32,
    pub use_conda: bool,
    pub dryrun: bool,
    pub jobname: String,
    #[serde(flatten)]
    pub grid: Option<GridSettings>,
}

impl EngineSettings {
    pub fn grid(dryrun: bool) -> Self {
        EngineSettings {
            cores: GRID_CORES,
            latency_wait: LATENCY_WAIT,
            use_conda: true,
            dryrun,
            jobname: JOB_NAME.to_string(),
            grid: Some(GridSettings {
                drmaa: DRMAA_SPEC.to_string(),
                drmaa_log_dir: PathBuf::from(DRMAA_LOG_DIR),
            }),
        }
    }

    pub fn local(cores: usize, dryrun: bool) -> Self {
        EngineSettings {
            cores,
            latency_wait: LATENCY_WAIT,
            use_conda: true,
            dryrun,
            jobname: JOB_NAME.to_string(),
            grid: None,
        }
    }
}


#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub params_path: PathBuf,
    pub config_path: PathBuf,
    pub params: RunParameters,
    pub settings: EngineSettings,
}


/// Builds both configurations and writes them to <output>/config/. The returned values are the
/// ones that were serialised, so callers never need to read the files back.
pub fn resolve(sample_sheet: &Path, request: &RunRequest, available_cores: usize)
        -> io::Result<ResolvedConfig> {
    let (params, settings) = build_configs(sample_sheet, request, available_cores)?;
    let config_dir = request.output_dir.join("config");
    create_dir_all(&config_dir)?;
    let config_path = config_dir.join("config.yaml");
    let params_path = config_dir.join("params.yaml");
    let documents = [(params_path.clone(), serde_yaml::to_string(&params)),
                     (config_path.clone(), serde_yaml::to_string(&settings))];
    let mut staged = Vec::new();
    for (path, yaml) in documents {
        let yaml = yaml.map_err(io::Error::other)?;
        let tmp_path = path.with_extension("yaml.tmp");
        if let Err(e) = write(&tmp_path, yaml) {
            for (tmp, _) in &staged {
                let _ = remove_file(tmp);
            }
            return Err(e);
        }
        staged.push((tmp_path, path));
    }
    // Both documents are complete on disk before either old file is replaced.
    for (tmp_path, path) in staged {
        rename(tmp_path, path)?;
    }
    Ok(ResolvedConfig { params_path, config_path, params, settings })
}


pub fn build_configs(sample_sheet: &Path, request: &RunRequest, available_cores: usize)
        -> io::Result<(RunParameters, EngineSettings)> {
    let background = request.background.clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKGROUND));
    let db = Databases { background };
    match request.mode {
        ExecutionMode::Grid => {
            let params = RunParameters {
                sample_sheet: sample_sheet.to_path_buf(),
                computing_execution: ExecutionMode::Grid,
                db,
                threads: None,
            };
            Ok((params, EngineSettings::grid(request.dryrun)))
        }
        ExecutionMode::Local => {
            let allocation = ResourceAllocation::new(request.threads, available_cores)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!(
                    "--threads {} leaves no usable cores on a host with {} cores",
                    request.threads, available_cores)))?;
            let params = RunParameters {
                sample_sheet: sample_sheet.to_path_buf(),
                computing_execution: ExecutionMode::Local,
                db,
                threads: Some(StageThreads::from(&allocation)),
            };
            Ok((params, EngineSettings::local(allocation.usable_cores, request.dryrun)))
        }
    }
}
