//! Pluggable student persistence.
//!
//! The pipeline never touches a concrete database: the commit stage talks to
//! [`StudentStore`], keyed by the roster's student identifier. [`MemoryStore`]
//! backs library consumers and tests; [`JsonStore`] backs the CLI with a flat
//! JSON file loaded on open and written back on save.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::info;

use crate::data::PersistedStudent;

pub trait StudentStore {
    /// All persisted students, ordered by student identifier.
    fn all(&self) -> Result<Vec<PersistedStudent>>;

    fn find_by_student_id(&self, student_id: &str) -> Result<Option<PersistedStudent>>;

    /// Adds a new student. Fails when the student identifier is already taken;
    /// callers decide between insert and update via [`find_by_student_id`].
    ///
    /// [`find_by_student_id`]: StudentStore::find_by_student_id
    fn insert(&mut self, student: PersistedStudent) -> Result<()>;

    /// Overwrites the record holding this student identifier.
    fn update(&mut self, student: PersistedStudent) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, PersistedStudent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StudentStore for MemoryStore {
    fn all(&self) -> Result<Vec<PersistedStudent>> {
        Ok(self.records.values().cloned().collect())
    }

    fn find_by_student_id(&self, student_id: &str) -> Result<Option<PersistedStudent>> {
        Ok(self.records.get(student_id).cloned())
    }

    fn insert(&mut self, student: PersistedStudent) -> Result<()> {
        if self.records.contains_key(&student.student_id) {
            bail!("Student '{}' already exists", student.student_id);
        }
        self.records.insert(student.student_id.clone(), student);
        Ok(())
    }

    fn update(&mut self, student: PersistedStudent) -> Result<()> {
        if !self.records.contains_key(&student.student_id) {
            bail!("Student '{}' does not exist", student.student_id);
        }
        self.records.insert(student.student_id.clone(), student);
        Ok(())
    }
}

/// File-backed store used by `roster-ingest import`. The whole collection is
/// held in memory between `open` and `save`; a roster upload is small enough
/// that partial writes are not worth the complexity.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Loads the store file, treating a missing file as an empty collection.
    pub fn open(path: &Path) -> Result<Self> {
        let mut inner = MemoryStore::new();
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Reading student store {path:?}"))?;
            let students: Vec<PersistedStudent> = serde_json::from_str(&raw)
                .with_context(|| format!("Parsing student store {path:?}"))?;
            for student in students {
                inner.insert(student)?;
            }
        }
        info!(
            "Opened student store {path:?} with {} record(s)",
            inner.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn save(&self) -> Result<()> {
        let students = self.inner.all()?;
        let serialized =
            serde_json::to_string_pretty(&students).context("Serializing student store")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Writing student store {:?}", self.path))?;
        info!(
            "Saved {} record(s) to student store {:?}",
            students.len(),
            self.path
        );
        Ok(())
    }
}

impl StudentStore for JsonStore {
    fn all(&self) -> Result<Vec<PersistedStudent>> {
        self.inner.all()
    }

    fn find_by_student_id(&self, student_id: &str) -> Result<Option<PersistedStudent>> {
        self.inner.find_by_student_id(student_id)
    }

    fn insert(&mut self, student: PersistedStudent) -> Result<()> {
        self.inner.insert(student)
    }

    fn update(&mut self, student: PersistedStudent) -> Result<()> {
        self.inner.update(student)
    }
}
