// This file contains miscellaneous functions used by various parts of metasm.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::env;
use std::fs::{File, create_dir_all};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::available_parallelism;
use std::time::Duration;
use which::which;


pub fn create_dir(dir_path: &Path) {
    match create_dir_all(dir_path) {
        Ok(_) => {},
        Err(e) => quit_with_error(&format!("failed to create directory {}\n{}", dir_path.display(), e)),
    }
}


pub fn check_if_file_exists(filename: &Path) {
    // Quits with an error if the given path is not an existing file.
    if !filename.exists() {
        quit_with_error(&format!("file does not exist: {}", filename.display()));
    }
    if !filename.is_file() {
        quit_with_error(&format!("{} is not a file", filename.display()));
    }
}


pub fn check_if_dir_exists(dir: &Path) {
    // Quits with an error if the given path is not an existing directory.
    if !dir.exists() {
        quit_with_error(&format!("directory does not exist: {}", dir.display()));
    }
    if !dir.is_dir() {
        quit_with_error(&format!("{} is not a directory", dir.display()));
    }
}


pub fn check_if_dir_is_not_dir(dir: &Path) {
    // Quits with an error if the given path exists but is not a directory (not existing is okay).
    if dir.exists() && !dir.is_dir() {
        quit_with_error(&format!("{} exists but is not a directory", dir.display()));
    }
}


pub fn save_yaml<T: Serialize>(yaml_filename: &Path, data: &T) -> io::Result<()> {
    let yaml_string = serde_yaml::to_string(data).map_err(io::Error::other)?;
    let mut file = File::create(yaml_filename)?;
    file.write_all(yaml_string.as_bytes())?;
    Ok(())
}


pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => quit_with_error(&format!("unable to determine current directory\n{}", e)),
    }
}


pub fn find_program(name: &str) -> PathBuf {
    which(name).unwrap_or_else(|_| {
        quit_with_error(&format!("required program '{name}' not found in $PATH"))
    })
}


pub fn available_threads() -> usize {
    available_parallelism().map(|n| n.get()).unwrap_or(1)
}


pub fn default_threads() -> usize {
    available_threads().min(128)
}


#[cfg(not(test))]
pub fn quit_with_error(text: &str) -> ! {
    // For friendly error messages, this function normally just prints the error and quits.
    eprintln!();
    eprintln!("Error: {}", text);
    std::process::exit(1);
}
#[cfg(test)]
pub fn quit_with_error(text: &str) -> ! {
    // But when running unit tests, this function instead panics so I can catch it for the test.
    panic!("{}", text);
}


pub fn format_duration(duration: std::time::Duration) -> String {
    let microseconds = duration.as_micros() % 1000000;
    let seconds =      duration.as_micros() / 1000000 % 60;
    let minutes =      duration.as_micros() / 1000000 / 60 % 60;
    let hours =        duration.as_micros() / 1000000 / 60 / 60;
    format!("{}:{:02}:{:02}.{:06}", hours, minutes, seconds, microseconds)
}


pub fn spinner(message: &str) -> ProgressBar {
    if cfg!(test) {
        ProgressBar::hidden() // don't show a spinner during unit tests
    } else {
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
                .template("{spinner} {msg}").unwrap(),
        );
        pb.set_message(message.to_string());
        pb
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::tests::make_test_file;

    #[test]
    fn test_format_duration() {
        let d1 = std::time::Duration::from_micros(123456789);
        let d2 = std::time::Duration::from_micros(3661000001);
        let d3 = std::time::Duration::from_micros(360959000001);
        assert_eq!(format_duration(d1), "0:02:03.456789");
        assert_eq!(format_duration(d2), "1:01:01.000001");
        assert_eq!(format_duration(d3), "100:15:59.000001");
    }

    #[test]
    fn test_default_threads() {
        assert!(default_threads() >= 1);
        assert!(default_threads() <= 128);
        assert!(default_threads() <= available_threads());
    }

    #[test]
    fn test_absolute_path() {
        assert_eq!(absolute_path(Path::new("/a/b")), PathBuf::from("/a/b"));
        let relative = absolute_path(Path::new("out"));
        assert!(relative.is_absolute());
        assert!(relative.ends_with("out"));
    }

    #[test]
    fn test_create_dir() {
        let temp_dir = tempdir().unwrap();
        let new_dir = temp_dir.path().join("a").join("b");
        create_dir(&new_dir);
        assert!(new_dir.is_dir());
        create_dir(&new_dir);  // already existing is fine
        assert!(new_dir.is_dir());
    }

    #[test]
    fn test_check_if_dir_exists() {
        let temp_dir = tempdir().unwrap();
        check_if_dir_exists(temp_dir.path());
    }

    #[test]
    #[should_panic(expected = "directory does not exist")]
    fn test_check_if_dir_exists_missing() {
        let temp_dir = tempdir().unwrap();
        check_if_dir_exists(&temp_dir.path().join("missing"));
    }

    #[test]
    #[should_panic(expected = "exists but is not a directory")]
    fn test_check_if_dir_is_not_dir() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("file.txt");
        make_test_file(&file, "abc");
        check_if_dir_is_not_dir(temp_dir.path());
        check_if_dir_is_not_dir(&temp_dir.path().join("missing"));
        check_if_dir_is_not_dir(&file);
    }

    #[test]
    #[should_panic(expected = "not found in $PATH")]
    fn test_find_program_missing() {
        find_program("metasm-program-that-does-not-exist");
    }
}
