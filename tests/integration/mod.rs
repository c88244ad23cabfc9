// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in for `java -jar de.unihd.dbs.heideltime.standalone.jar ...`:
/// records its arguments, then wraps the input file in TimeML and tags every "today".
pub const FAKE_HEIDELTIME: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/last_args.txt"
for input; do :; done
printf '<?xml version="1.0"?>\n<!DOCTYPE TimeML SYSTEM "TimeML.dtd">\n<TimeML>\n'
sed 's/today/<TIMEX3 tid="t1" type="DATE" value="PRESENT_REF">today<\/TIMEX3>/g' "$input"
printf '\n</TimeML>\n'
"#;

/// Stand-in that fails the way HeidelTime does on a bad config file
pub const FAILING_HEIDELTIME: &str = r#"#!/bin/sh
echo "Config file not found" >&2
exit 3
"#;

/// Stand-in that never finishes in time
pub const SLOW_HEIDELTIME: &str = r#"#!/bin/sh
sleep 10
"#;

/// Test fixture helper for a temporary HeidelTime installation directory
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write a file relative to the fixture root
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Install an executable launcher script and return its path
    #[cfg(unix)]
    pub fn create_launcher(&self, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.create_file(name, script);
        let mut perms = fs::metadata(&path).expect("Failed to stat launcher").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("Failed to make launcher executable");
        path
    }

    /// Arguments the fake launcher was last called with, one per line
    pub fn last_args(&self) -> Vec<String> {
        fs::read_to_string(self.root_path.join("last_args.txt"))
            .expect("Launcher did not record its arguments")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Character slice `[start, end)` of `text`
pub fn char_slice(text: &str, char_pos: [usize; 2]) -> String {
    text.chars().skip(char_pos[0]).take(char_pos[1] - char_pos[0]).collect()
}
