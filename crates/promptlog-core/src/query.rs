use crate::errors::{RecordError, RecordResult};
use crate::model::{EvaluationRecord, Score};

/// Listing predicates. All present predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub tag: Option<String>,
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
}

impl RecordFilter {
    /// Rejects bounds outside 1..=5 and inverted ranges.
    pub fn validate(&self) -> RecordResult<()> {
        for (field, bound) in [("min_score", self.min_score), ("max_score", self.max_score)] {
            if let Some(v) = bound {
                if !(Score::MIN..=Score::MAX).contains(&v) {
                    return Err(RecordError::validation(
                        field,
                        format!("must be between 1 and 5, got {}", v),
                    ));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_score, self.max_score) {
            if min > max {
                return Err(RecordError::validation(
                    "min_score",
                    format!("min score {} is greater than max score {}", min, max),
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, record: &EvaluationRecord) -> bool {
        if let Some(tag) = &self.tag {
            if !record.has_tag(tag) {
                return false;
            }
        }
        if self.min_score.is_none() && self.max_score.is_none() {
            return true;
        }
        let Some(score) = record.score().map(|s| s.value()) else {
            return false;
        };
        self.min_score.map_or(true, |min| score >= min)
            && self.max_score.map_or(true, |max| score <= max)
    }
}

/// Matching records in ascending id order (chronological, then by daily
/// sequence).
pub fn filter<I>(records: I, f: &RecordFilter) -> Vec<EvaluationRecord>
where
    I: IntoIterator<Item = EvaluationRecord>,
{
    let mut out: Vec<EvaluationRecord> = records.into_iter().filter(|r| f.matches(r)).collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Evaluation, RecordId};
    use chrono::NaiveDate;

    fn rec(seq: u16, tags: &[&str], score: Option<i64>) -> EvaluationRecord {
        let id = RecordId::new(NaiveDate::from_ymd_opt(2025, 5, 17).unwrap(), seq).unwrap();
        let mut r = EvaluationRecord::new(
            id,
            format!("prompt {seq}"),
            "response",
            tags.iter().map(|t| t.to_string()).collect(),
            "",
        )
        .unwrap();
        if let Some(s) = score {
            r.evaluation = Evaluation::Scored {
                prompt: None,
                response: format!("Score: {s}"),
                score: Score::new(s).unwrap(),
            };
        }
        r
    }

    fn fixture() -> Vec<EvaluationRecord> {
        // deliberately out of order
        vec![
            rec(3, &["a", "b"], Some(4)),
            rec(1, &["a"], Some(2)),
            rec(4, &[], Some(5)),
            rec(2, &["b"], Some(3)),
        ]
    }

    fn seqs(records: &[EvaluationRecord]) -> Vec<u16> {
        records.iter().map(|r| r.id.seq()).collect()
    }

    #[test]
    fn tag_filter() {
        let f = RecordFilter {
            tag: Some("a".into()),
            ..Default::default()
        };
        assert_eq!(seqs(&filter(fixture(), &f)), vec![1, 3]);
    }

    #[test]
    fn tag_match_is_case_sensitive() {
        let f = RecordFilter {
            tag: Some("A".into()),
            ..Default::default()
        };
        assert!(filter(fixture(), &f).is_empty());
    }

    #[test]
    fn min_score_filter() {
        let f = RecordFilter {
            min_score: Some(4),
            ..Default::default()
        };
        assert_eq!(seqs(&filter(fixture(), &f)), vec![3, 4]);
    }

    #[test]
    fn score_range_is_inclusive() {
        let f = RecordFilter {
            min_score: Some(3),
            max_score: Some(4),
            ..Default::default()
        };
        assert_eq!(seqs(&filter(fixture(), &f)), vec![2, 3]);
    }

    #[test]
    fn unscored_records_only_without_bounds() {
        let mut all = fixture();
        all.push(rec(5, &["a"], None));
        assert_eq!(seqs(&filter(all.clone(), &RecordFilter::default())), vec![1, 2, 3, 4, 5]);

        let bounded = RecordFilter {
            max_score: Some(5),
            ..Default::default()
        };
        assert_eq!(seqs(&filter(all, &bounded)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn predicates_compose() {
        let f = RecordFilter {
            tag: Some("b".into()),
            min_score: Some(4),
            max_score: None,
        };
        assert_eq!(seqs(&filter(fixture(), &f)), vec![3]);
    }

    #[test]
    fn filtering_is_repeatable() {
        let f = RecordFilter {
            tag: Some("a".into()),
            ..Default::default()
        };
        let input = fixture();
        assert_eq!(filter(input.clone(), &f), filter(input, &f));
    }

    #[test]
    fn bounds_are_validated() {
        assert!(RecordFilter {
            min_score: Some(0),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(RecordFilter {
            min_score: Some(4),
            max_score: Some(2),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(RecordFilter {
            min_score: Some(1),
            max_score: Some(5),
            tag: None,
        }
        .validate()
        .is_ok());
    }
}
