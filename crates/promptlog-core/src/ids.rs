//! Daily sequence allocation for record ids.
//!
//! Allocation is a pure function of the ids already on disk. There is no
//! counter to persist, so a restarted process picks up where the directory
//! left off, and two racing processes that pick the same id are told apart by
//! the store's create-if-absent write.

use crate::errors::{RecordError, RecordResult};
use crate::model::{format_date, RecordId, MAX_SEQUENCE};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Smallest free sequence number for `date`, ignoring ids from other days.
pub fn allocate<'a, I>(date: NaiveDate, existing: I) -> RecordResult<RecordId>
where
    I: IntoIterator<Item = &'a RecordId>,
{
    let taken: BTreeSet<u16> = existing
        .into_iter()
        .filter(|id| id.date() == date)
        .map(|id| id.seq())
        .collect();

    let seq = (1..=MAX_SEQUENCE)
        .find(|s| !taken.contains(s))
        .ok_or_else(|| RecordError::CapacityExceeded {
            date: format_date(date),
        })?;

    RecordId::new(date, seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 17).unwrap()
    }

    fn ids(date: NaiveDate, seqs: &[u16]) -> Vec<RecordId> {
        seqs.iter().map(|s| RecordId::new(date, *s).unwrap()).collect()
    }

    #[test]
    fn first_id_of_the_day_is_001() {
        let id = allocate(day(), std::iter::empty::<&RecordId>()).unwrap();
        assert_eq!(id.to_string(), "2025-05-17-001");
    }

    #[test]
    fn continues_after_existing_ids() {
        let existing = ids(day(), &[1, 2]);
        assert_eq!(allocate(day(), &existing).unwrap().seq(), 3);
    }

    #[test]
    fn fills_the_lowest_gap() {
        let existing = ids(day(), &[1, 3, 4]);
        assert_eq!(allocate(day(), &existing).unwrap().seq(), 2);
    }

    #[test]
    fn other_days_do_not_count() {
        let other = day().pred_opt().unwrap();
        let existing = ids(other, &[1, 2, 3]);
        assert_eq!(allocate(day(), &existing).unwrap().seq(), 1);
    }

    #[test]
    fn deterministic_for_same_input() {
        let existing = ids(day(), &[1, 2, 5]);
        let a = allocate(day(), &existing).unwrap();
        let b = allocate(day(), &existing).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn full_day_is_capacity_exceeded() {
        let all: Vec<u16> = (1..=MAX_SEQUENCE).collect();
        let existing = ids(day(), &all);
        let err = allocate(day(), &existing).unwrap_err();
        assert!(matches!(err, RecordError::CapacityExceeded { .. }));
    }
}
