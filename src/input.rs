// This file contains the code for checking the input directory for sequencing reads.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};


const FASTQ_SUFFIXES: [&str; 4] = [".fastq.gz", ".fq.gz", ".fastq", ".fq"];


/// Returns true if at least one file in the directory has a recognised FASTQ suffix. An empty
/// directory gives false, an unreadable one gives an error.
pub fn check_input_files(in_dir: &Path) -> io::Result<bool> {
    for entry in read_dir(in_dir)? {
        if is_fastq_file(&entry?.path()) {
            return Ok(true);
        }
    }
    Ok(false)
}


/// All FASTQ files directly inside the directory, in sorted order.
pub fn find_fastq_files(in_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut fastq_files = Vec::new();
    for entry in read_dir(in_dir)? {
        let path = entry?.path();
        if is_fastq_file(&path) {
            fastq_files.push(path);
        }
    }
    fastq_files.sort_unstable();
    Ok(fastq_files)
}


fn is_fastq_file(path: &Path) -> bool {
    path.is_file() && path.file_name().and_then(|n| n.to_str()).and_then(fastq_suffix).is_some()
}


pub fn fastq_suffix(filename: &str) -> Option<&'static str> {
    // The whole suffix chain must be recognised, so sample.R1.fastq.gz (chain .R1.fastq.gz) is
    // not a FASTQ file but sample_R1.fastq.gz is.
    let chain = suffix_chain(filename)?;
    FASTQ_SUFFIXES.iter().copied().find(|suffix| *suffix == chain)
}


fn suffix_chain(filename: &str) -> Option<&str> {
    // Everything from the first dot after the stem. Leading dots belong to the stem and a name
    // ending in a dot has no suffixes.
    let name = filename.trim_start_matches('.');
    if name.ends_with('.') {
        return None;
    }
    name.find('.').map(|i| &name[i..])
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::create_dir;
    use tempfile::tempdir;

    use crate::tests::{make_gzipped_test_file, make_test_file};

    #[test]
    fn test_fastq_suffix() {
        assert_eq!(fastq_suffix("reads.fastq"), Some(".fastq"));
        assert_eq!(fastq_suffix("reads.fq"), Some(".fq"));
        assert_eq!(fastq_suffix("reads.fastq.gz"), Some(".fastq.gz"));
        assert_eq!(fastq_suffix("reads.fq.gz"), Some(".fq.gz"));
        assert_eq!(fastq_suffix("sample_R1.fastq.gz"), Some(".fastq.gz"));
        assert_eq!(fastq_suffix("sample.R1.fastq.gz"), None);
        assert_eq!(fastq_suffix("reads.fastq.gz.bak"), None);
        assert_eq!(fastq_suffix("reads."), None);
        assert_eq!(fastq_suffix("reads.fasta"), None);
        assert_eq!(fastq_suffix("reads.gz"), None);
        assert_eq!(fastq_suffix("reads.fastq.bz2"), None);
        assert_eq!(fastq_suffix("readme.txt"), None);
        assert_eq!(fastq_suffix(".fastq"), None);
    }

    #[test]
    fn test_check_input_files_gzipped() {
        let temp_dir = tempdir().unwrap();
        make_gzipped_test_file(&temp_dir.path().join("sample1.fastq.gz"), "@r\nACGT\n+\nIIII\n");
        assert!(check_input_files(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_check_input_files_mixed() {
        let temp_dir = tempdir().unwrap();
        make_test_file(&temp_dir.path().join("notes.txt"), "abc");
        make_test_file(&temp_dir.path().join("sample2.fq"), "@r\nACGT\n+\nIIII\n");
        make_test_file(&temp_dir.path().join("assembly.fasta"), ">a\nACGT\n");
        assert!(check_input_files(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_check_input_files_none() {
        let temp_dir = tempdir().unwrap();
        make_test_file(&temp_dir.path().join("readme.txt"), "abc");
        assert!(!check_input_files(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_suffix_chain() {
        assert_eq!(suffix_chain("reads.fastq.gz"), Some(".fastq.gz"));
        assert_eq!(suffix_chain("sample.R1.fastq.gz"), Some(".R1.fastq.gz"));
        assert_eq!(suffix_chain(".hidden.fq"), Some(".fq"));
        assert_eq!(suffix_chain(".fastq"), None);
        assert_eq!(suffix_chain("reads"), None);
        assert_eq!(suffix_chain("reads.fq."), None);
    }

    #[test]
    fn test_check_input_files_extra_dots() {
        // Only the full suffix chain counts, so a dotted read label hides the FASTQ suffix.
        let temp_dir = tempdir().unwrap();
        make_gzipped_test_file(&temp_dir.path().join("sample.R1.fastq.gz"), "@r\nACGT\n+\nIIII\n");
        assert!(!check_input_files(temp_dir.path()).unwrap());
        make_gzipped_test_file(&temp_dir.path().join("sample_R1.fastq.gz"), "@r\nACGT\n+\nIIII\n");
        assert!(check_input_files(temp_dir.path()).unwrap());
        assert_eq!(find_fastq_files(temp_dir.path()).unwrap(),
                   vec![temp_dir.path().join("sample_R1.fastq.gz")]);
    }

    #[test]
    fn test_check_input_files_empty() {
        let temp_dir = tempdir().unwrap();
        assert!(!check_input_files(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_check_input_files_ignores_dirs() {
        let temp_dir = tempdir().unwrap();
        create_dir(temp_dir.path().join("old_run.fastq")).unwrap();
        assert!(!check_input_files(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_check_input_files_missing_dir() {
        let temp_dir = tempdir().unwrap();
        assert!(check_input_files(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_find_fastq_files() {
        let temp_dir = tempdir().unwrap();
        make_test_file(&temp_dir.path().join("b_R1.fq"), "");
        make_test_file(&temp_dir.path().join("a_R1.fastq"), "");
        make_test_file(&temp_dir.path().join("c.txt"), "");
        let files = find_fastq_files(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("a_R1.fastq"),
                               temp_dir.path().join("b_R1.fq")]);
    }
}
