use crate::errors::{RecordError, RecordResult};
use crate::model::{EvaluationRecord, RecordId};
use chrono::NaiveDate;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const RECORD_EXT: &str = "json";
const TEMP_PREFIX: &str = ".promptlog-";
const TEMP_SUFFIX: &str = ".tmp";

/// One JSON file per record, named `<id>.json`, in a single directory.
///
/// Every write goes through a temp file in the same directory. New records
/// are committed with a no-clobber rename so an existing id is never
/// overwritten; updates are committed with a plain rename.
#[derive(Clone, Debug)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: &Path) -> RecordResult<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| RecordError::io(dir, "failed to create records directory", e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXT))
    }

    /// Persists a brand-new record. Fails with `IdCollision` if a file for
    /// the id already exists at commit time, and with a validation error if
    /// the record would not load again.
    pub fn create(&self, record: &EvaluationRecord) -> RecordResult<PathBuf> {
        record.validate()?;
        let path = self.record_path(&record.id);
        let tmp = self.write_temp(record, &path)?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                tracing::info!(
                    event = "record_created",
                    id = %record.id,
                    path = %path.display()
                );
                Ok(path)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(RecordError::IdCollision {
                    id: record.id.to_string(),
                })
            }
            Err(e) => Err(RecordError::io(
                &path,
                "failed to commit record file",
                e.error,
            )),
        }
    }

    pub fn read(&self, id: &RecordId) -> RecordResult<EvaluationRecord> {
        let path = self.record_path(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RecordError::NotFound { id: id.to_string() })
            }
            Err(e) => return Err(RecordError::io(&path, "failed to read record file", e)),
        };
        let record = decode(&path, &raw)?;
        if record.id != *id {
            return Err(RecordError::corrupted(
                &path,
                format!("file holds record {}", record.id),
            ));
        }
        Ok(record)
    }

    /// Loads a record, lets `mutator` change it and writes it back.
    ///
    /// Only the evaluation fields may change. If the mutator touches any other
    /// field, leaves the record in a state that would not load again, or fails
    /// itself, nothing is written.
    pub fn update<F>(&self, id: &RecordId, mutator: F) -> RecordResult<EvaluationRecord>
    where
        F: FnOnce(&mut EvaluationRecord) -> RecordResult<()>,
    {
        let original = self.read(id)?;
        let mut next = original.clone();
        mutator(&mut next)?;
        next.check_immutable(&original)?;
        next.validate()?;

        let path = self.record_path(id);
        let tmp = self.write_temp(&next, &path)?;
        tmp.persist(&path)
            .map_err(|e| RecordError::io(&path, "failed to replace record file", e.error))?;

        tracing::info!(
            event = "record_updated",
            id = %id,
            state = next.evaluation.state_name()
        );
        Ok(next)
    }

    /// Every record in the directory, in no particular order.
    pub fn list_all(&self) -> RecordResult<Vec<EvaluationRecord>> {
        let mut records = Vec::new();
        for (id, path) in self.scan()? {
            let raw = fs::read_to_string(&path)
                .map_err(|e| RecordError::io(&path, "failed to read record file", e))?;
            let record = decode(&path, &raw)?;
            if record.id != id {
                return Err(RecordError::corrupted(
                    &path,
                    format!("file holds record {}", record.id),
                ));
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Ids present on disk, read from file names only.
    pub fn ids(&self) -> RecordResult<Vec<RecordId>> {
        Ok(self.scan()?.into_iter().map(|(id, _)| id).collect())
    }

    pub fn ids_on(&self, date: NaiveDate) -> RecordResult<Vec<RecordId>> {
        let mut ids = self.ids()?;
        ids.retain(|id| id.date() == date);
        Ok(ids)
    }

    fn scan(&self) -> RecordResult<Vec<(RecordId, PathBuf)>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| RecordError::io(&self.dir, "failed to list records directory", e))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| RecordError::io(&self.dir, "failed to list records directory", e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<RecordId>() {
                Ok(id) => found.push((id, path)),
                Err(_) => {
                    tracing::debug!(event = "scan_skip", path = %path.display());
                }
            }
        }
        tracing::debug!(event = "scan", dir = %self.dir.display(), records = found.len());
        Ok(found)
    }

    fn write_temp(&self, record: &EvaluationRecord, target: &Path) -> RecordResult<NamedTempFile> {
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| RecordError::io(target, "failed to create temp file", e))?;

        serde_json::to_writer_pretty(&mut tmp, record)
            .map_err(|e| RecordError::io(target, "failed to serialize record", e.into()))?;
        tmp.write_all(b"\n")
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| RecordError::io(target, "failed to write temp file", e))?;
        Ok(tmp)
    }
}

fn decode(path: &Path, raw: &str) -> RecordResult<EvaluationRecord> {
    serde_json::from_str(raw).map_err(|e| RecordError::corrupted(path, e.to_string()))
}
