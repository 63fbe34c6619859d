use crate::errors::{RecordError, RecordResult};
use crate::ids;
use crate::model::{normalize_tags, EvaluationRecord, RecordId};
use crate::query::{self, RecordFilter};
use crate::storage::RecordStore;
use chrono::NaiveDate;

/// How many times `log` re-allocates after losing a create race.
pub const MAX_CREATE_ATTEMPTS: u32 = 8;

#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub prompt: String,
    pub response: String,
    pub tags: Vec<String>,
    pub notes: String,
}

/// Logging, lookup and listing on top of a [`RecordStore`].
#[derive(Clone)]
pub struct Journal {
    store: RecordStore,
}

impl Journal {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Creates a record dated `date` and returns it with its new id.
    ///
    /// The next id comes from a fresh scan of the directory on every attempt.
    /// When another process commits the same id first, the scan is repeated,
    /// up to [`MAX_CREATE_ATTEMPTS`] times.
    pub fn log(&self, date: NaiveDate, entry: NewEntry) -> RecordResult<EvaluationRecord> {
        self.log_with_hook(date, entry, |_| {})
    }

    /// `log`, calling `before_create` with each candidate id between the
    /// directory scan and the create. Tests use it to stage a competing
    /// writer at that point.
    pub(crate) fn log_with_hook<F>(
        &self,
        date: NaiveDate,
        entry: NewEntry,
        mut before_create: F,
    ) -> RecordResult<EvaluationRecord>
    where
        F: FnMut(&RecordId),
    {
        let tags = normalize_tags(entry.tags)?;

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let existing = self.store.ids_on(date)?;
            let id = ids::allocate(date, &existing)?;
            let record = EvaluationRecord::new(
                id,
                entry.prompt.clone(),
                entry.response.clone(),
                tags.clone(),
                entry.notes.clone(),
            )?;

            before_create(&id);
            match self.store.create(&record) {
                Ok(_) => return Ok(record),
                Err(RecordError::IdCollision { id }) => {
                    tracing::warn!(event = "id_collision", id = %id, attempt, "retrying allocation");
                }
                Err(e) => return Err(e),
            }
        }

        Err(RecordError::Storage {
            path: self.store.dir().to_path_buf(),
            message: format!(
                "gave up allocating an id for {} after {} collisions",
                crate::model::format_date(date),
                MAX_CREATE_ATTEMPTS
            ),
            source: None,
        })
    }

    pub fn get(&self, id: &RecordId) -> RecordResult<EvaluationRecord> {
        self.store.read(id)
    }

    pub fn list(&self, f: &RecordFilter) -> RecordResult<Vec<EvaluationRecord>> {
        f.validate()?;
        let all = self.store.list_all()?;
        Ok(query::filter(all, f))
    }
}

/// Parses a user-supplied id. Anything that is not a well-formed id cannot
/// name a stored record, so it is reported as not found.
pub fn lookup_id(raw: &str) -> RecordResult<RecordId> {
    raw.trim()
        .parse()
        .map_err(|_| RecordError::NotFound { id: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(prompt: &str) -> NewEntry {
        NewEntry {
            prompt: prompt.into(),
            response: "response".into(),
            ..Default::default()
        }
    }

    #[test]
    fn sequential_ids_per_day() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let journal = Journal::new(RecordStore::open(dir.path())?);
        let day = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        let next_day = day.succ_opt().unwrap();

        assert_eq!(journal.log(day, entry("P1"))?.id.to_string(), "2025-05-17-001");
        assert_eq!(journal.log(day, entry("P2"))?.id.to_string(), "2025-05-17-002");
        assert_eq!(journal.log(next_day, entry("P3"))?.id.to_string(), "2025-05-18-001");
        Ok(())
    }

    fn racer(store: &RecordStore) -> impl FnMut(&RecordId) + '_ {
        move |id: &RecordId| {
            let rec = EvaluationRecord::new(*id, "racer", "won", vec![], "").unwrap();
            store.create(&rec).unwrap();
        }
    }

    #[test]
    fn lost_race_retries_with_next_sequence() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = RecordStore::open(dir.path())?;
        let journal = Journal::new(store.clone());
        let day = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();

        let mut steal = racer(&store);
        let mut raced = false;
        let rec = journal.log_with_hook(day, entry("P1"), |id| {
            if !raced {
                raced = true;
                steal(id);
            }
        })?;

        assert_eq!(rec.id.to_string(), "2025-05-17-002");
        assert_eq!(store.read(&rec.id)?.prompt, "P1");
        let first = store.read(&RecordId::new(day, 1)?)?;
        assert_eq!(first.prompt, "racer");
        Ok(())
    }

    #[test]
    fn collisions_past_the_cap_become_a_storage_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = RecordStore::open(dir.path())?;
        let journal = Journal::new(store.clone());
        let day = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();

        let err = journal
            .log_with_hook(day, entry("P1"), racer(&store))
            .unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Storage);
        assert!(err.to_string().contains("gave up allocating"), "{err}");

        let stored = store.list_all()?;
        assert_eq!(stored.len(), MAX_CREATE_ATTEMPTS as usize);
        assert!(stored.iter().all(|r| r.prompt == "racer"));
        Ok(())
    }

    #[test]
    fn malformed_tag_creates_nothing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let journal = Journal::new(RecordStore::open(dir.path())?);
        let day = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        let mut e = entry("P1");
        e.tags = vec!["".into()];
        assert!(journal.log(day, e).is_err());
        assert!(journal.store().ids()?.is_empty());
        Ok(())
    }

    #[test]
    fn lookup_id_maps_garbage_to_not_found() {
        let err = lookup_id("non-existent-id").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::NotFound);
        assert!(err.to_string().contains("not found"));
        assert_eq!(lookup_id(" 2025-05-17-001 ").unwrap().seq(), 1);
    }

    #[test]
    fn list_rejects_bad_bounds() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let journal = Journal::new(RecordStore::open(dir.path())?);
        let f = RecordFilter {
            min_score: Some(6),
            ..Default::default()
        };
        assert!(journal.list(&f).is_err());
        Ok(())
    }
}
