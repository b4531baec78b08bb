#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Canonical eleven-column header used by most roster fixtures.
pub const ROSTER_HEADER: &str =
    "Student_ID,Name,Gender,Department,Year_Of_Study,CGPA,Email,Phone_Number,Parent_Number,City,Attendance_Percentage";

/// One clean data row matching [`ROSTER_HEADER`].
pub fn roster_row(student_id: &str, name: &str, phone: &str) -> String {
    format!(
        "{student_id},{name},F,CSE,2,8.4,{}@college.edu,{phone},9123456780,Pune,92",
        student_id.to_lowercase()
    )
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
