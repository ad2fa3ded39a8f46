// This file contains the code for building the sample sheet: a YAML manifest that tells the
// workflow which read files belong to which sample.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::input::{fastq_suffix, find_fastq_files};
use crate::misc::save_yaml;


// Matches paired-end Illumina-style names, e.g. sample_R1.fastq.gz or sample_S1_L001_R2_001.fq.
const PAIRED_PATTERN: &str = r"^(.*)(_|\.)R?(1|2)(?:_.*\.|\..*\.|\.)f(ast)?q(\.gz)?$";


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SampleReads {
    #[serde(rename = "R1")]
    pub r1: PathBuf,
    #[serde(rename = "R2", default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<PathBuf>,
}


#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct SampleSheet {
    pub samples: BTreeMap<String, SampleReads>,
}

impl SampleSheet {
    pub fn from_dir(in_dir: &Path) -> io::Result<Self> {
        let fastq_files = find_fastq_files(in_dir)?;
        Self::from_files(&fastq_files)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn from_files(fastq_files: &[PathBuf]) -> Result<Self, String> {
        let paired = Regex::new(PAIRED_PATTERN).unwrap();
        let mut reads: BTreeMap<String, (Option<PathBuf>, Option<PathBuf>)> = BTreeMap::new();
        for path in fastq_files {
            let filename = path.file_name().and_then(|n| n.to_str())
                .ok_or_else(|| format!("{} is not a valid file name", path.display()))?;
            let (sample, read_num) = match paired.captures(filename) {
                Some(caps) => (caps[1].to_string(), caps[3].to_string()),
                None => {
                    let suffix = fastq_suffix(filename)
                        .ok_or_else(|| format!("{} is not a FASTQ file", path.display()))?;
                    (filename[..filename.len() - suffix.len()].to_string(), "1".to_string())
                }
            };
            let entry = reads.entry(sample.clone()).or_default();
            let slot = if read_num == "1" { &mut entry.0 } else { &mut entry.1 };
            if let Some(existing) = slot {
                return Err(format!("sample {} has more than one R{} file: {} and {}",
                                   sample, read_num, existing.display(), path.display()));
            }
            *slot = Some(path.clone());
        }
        let mut samples = BTreeMap::new();
        for (sample, (r1, r2)) in reads {
            let r1 = r1.ok_or_else(|| format!("sample {} has an R2 file but no R1 file", sample))?;
            samples.insert(sample, SampleReads { r1, r2 });
        }
        if samples.is_empty() {
            return Err("no samples could be identified".to_string());
        }
        Ok(SampleSheet { samples })
    }

    pub fn save_to_yaml(&self, filename: &Path) -> io::Result<()> {
        save_yaml(filename, self)
    }

    pub fn print_samples(&self) {
        for (name, reads) in &self.samples {
            match &reads.r2 {
                Some(r2) => eprintln!("  {}: {} + {}", name, reads.r1.display(), r2.display()),
                None     => eprintln!("  {}: {}", name, reads.r1.display()),
            }
        }
        eprintln!();
    }
}
