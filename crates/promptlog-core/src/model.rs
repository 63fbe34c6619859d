use crate::errors::{RecordError, RecordResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_SEQUENCE: u16 = 999;

pub fn parse_date(s: &str) -> RecordResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| RecordError::validation("date", format!("'{}' is not YYYY-MM-DD", s)))?;
    // chrono accepts single-digit months/days, ids need the padded form
    if format_date(date) != s {
        return Err(RecordError::validation(
            "date",
            format!("'{}' is not YYYY-MM-DD", s),
        ));
    }
    Ok(date)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Record identifier of the form `YYYY-MM-DD-NNN`.
///
/// Ordering is date first, then daily sequence, which matches the
/// lexicographic order of the rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    date: NaiveDate,
    seq: u16,
}

impl RecordId {
    pub fn new(date: NaiveDate, seq: u16) -> RecordResult<Self> {
        if seq == 0 || seq > MAX_SEQUENCE {
            return Err(RecordError::validation(
                "id",
                format!("sequence {} outside 1..={}", seq, MAX_SEQUENCE),
            ));
        }
        Ok(Self { date, seq })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn seq(&self) -> u16 {
        self.seq
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", format_date(self.date), self.seq)
    }
}

impl FromStr for RecordId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RecordError::validation("id", format!("'{}' is not YYYY-MM-DD-NNN", s));
        if s.len() != 14 || !s.is_ascii() || s.as_bytes()[10] != b'-' {
            return Err(bad());
        }
        let (date_part, seq_part) = (&s[..10], &s[11..]);
        if !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let date = parse_date(date_part).map_err(|_| bad())?;
        let seq: u16 = seq_part.parse().map_err(|_| bad())?;
        Self::new(date, seq).map_err(|_| bad())
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}

/// Judge score, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> RecordResult<Self> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(RecordError::validation(
                "score",
                format!("score must be between 1 and 5, got {}", value),
            ));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = RecordError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(s: Score) -> Self {
        s.0
    }
}

impl FromStr for Score {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed.parse().map_err(|_| {
            RecordError::validation(
                "score",
                format!("score must be an integer between 1 and 5, got '{}'", trimmed),
            )
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates tags and drops duplicates, keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> RecordResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(RecordError::validation("tags", "tag must not be empty"));
        }
        if tag.trim() != tag {
            return Err(RecordError::validation(
                "tags",
                format!("tag '{}' has leading or trailing whitespace", tag),
            ));
        }
        if tag.chars().any(char::is_control) {
            return Err(RecordError::validation(
                "tags",
                format!("tag {:?} contains control characters", tag),
            ));
        }
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    Ok(out)
}

/// Where a record stands in the judge workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Evaluation {
    #[default]
    Pending,
    /// Judge prompt rendered, verdict not recorded yet.
    PromptReady { prompt: String },
    Scored {
        prompt: Option<String>,
        response: String,
        score: Score,
    },
}

impl Evaluation {
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Evaluation::Pending => None,
            Evaluation::PromptReady { prompt } => Some(prompt),
            Evaluation::Scored { prompt, .. } => prompt.as_deref(),
        }
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            Evaluation::Scored { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<Score> {
        match self {
            Evaluation::Scored { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Evaluation::Scored { .. })
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Evaluation::Pending => "pending",
            Evaluation::PromptReady { .. } => "prompt_ready",
            Evaluation::Scored { .. } => "scored",
        }
    }
}

/// A change to the evaluation fields of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationUpdate {
    /// Attach (or re-render) the judge prompt. An existing verdict is kept.
    JudgePrompt(String),
    Verdict { response: String, score: Score },
}

impl EvaluationUpdate {
    pub fn apply(self, current: &Evaluation) -> RecordResult<Evaluation> {
        match self {
            EvaluationUpdate::JudgePrompt(prompt) => Ok(match current {
                Evaluation::Pending | Evaluation::PromptReady { .. } => {
                    Evaluation::PromptReady { prompt }
                }
                Evaluation::Scored {
                    response, score, ..
                } => Evaluation::Scored {
                    prompt: Some(prompt),
                    response: response.clone(),
                    score: *score,
                },
            }),
            EvaluationUpdate::Verdict { response, score } => {
                if response.trim().is_empty() {
                    return Err(RecordError::validation(
                        "evaluation_response",
                        "evaluation response is required",
                    ));
                }
                Ok(Evaluation::Scored {
                    prompt: current.prompt().map(str::to_string),
                    response,
                    score,
                })
            }
        }
    }
}

/// One logged prompt/response pair with its optional judge evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordFile", into = "RecordFile")]
pub struct EvaluationRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub prompt: String,
    pub response: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub evaluation: Evaluation,
}

impl EvaluationRecord {
    pub fn new(
        id: RecordId,
        prompt: impl Into<String>,
        response: impl Into<String>,
        tags: Vec<String>,
        notes: impl Into<String>,
    ) -> RecordResult<Self> {
        let prompt = prompt.into();
        let response = response.into();
        if prompt.trim().is_empty() {
            return Err(RecordError::validation("prompt", "prompt text is required"));
        }
        if response.trim().is_empty() {
            return Err(RecordError::validation(
                "response",
                "response text is required",
            ));
        }
        Ok(Self {
            id,
            date: id.date(),
            prompt,
            response,
            tags: normalize_tags(tags)?,
            notes: notes.into(),
            evaluation: Evaluation::Pending,
        })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn score(&self) -> Option<Score> {
        self.evaluation.score()
    }

    /// Checks what a record must satisfy to be read back from disk. The
    /// store runs this before committing any write.
    pub fn validate(&self) -> RecordResult<()> {
        if self.date != self.id.date() {
            return Err(RecordError::validation(
                "date",
                format!("date {} does not match id {}", format_date(self.date), self.id),
            ));
        }
        if let Evaluation::Scored { response, .. } = &self.evaluation {
            if response.trim().is_empty() {
                return Err(RecordError::validation(
                    "evaluation_response",
                    format!("record {} is scored without an evaluation response", self.id),
                ));
            }
        }
        if normalize_tags(self.tags.iter().map(String::as_str))? != self.tags {
            return Err(RecordError::validation("tags", "tags must not repeat"));
        }
        Ok(())
    }

    /// Returns the first immutable field that differs from `original`.
    pub fn check_immutable(&self, original: &EvaluationRecord) -> RecordResult<()> {
        let changed = if self.id != original.id {
            Some("id")
        } else if self.date != original.date {
            Some("date")
        } else if self.prompt != original.prompt {
            Some("prompt")
        } else if self.response != original.response {
            Some("response")
        } else if self.tags != original.tags {
            Some("tags")
        } else if self.notes != original.notes {
            Some("notes")
        } else {
            None
        };
        match changed {
            Some(field) => Err(RecordError::validation(
                field,
                format!("field is immutable once record {} is logged", original.id),
            )),
            None => Ok(()),
        }
    }
}

/// On-disk shape of a record: flat JSON object, evaluation keys omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordFile {
    id: String,
    date: String,
    prompt: String,
    response: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evaluation_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evaluation_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<Score>,
}

impl TryFrom<RecordFile> for EvaluationRecord {
    type Error = RecordError;

    fn try_from(raw: RecordFile) -> Result<Self, Self::Error> {
        let id: RecordId = raw.id.parse()?;
        let date = parse_date(&raw.date)?;
        if date != id.date() {
            return Err(RecordError::validation(
                "date",
                format!("date {} does not match id {}", raw.date, raw.id),
            ));
        }
        let evaluation = match (raw.evaluation_prompt, raw.evaluation_response, raw.score) {
            (None, None, None) => Evaluation::Pending,
            (Some(prompt), None, None) => Evaluation::PromptReady { prompt },
            (prompt, Some(response), Some(score)) if !response.trim().is_empty() => {
                Evaluation::Scored {
                    prompt,
                    response,
                    score,
                }
            }
            (_, _, Some(_)) => {
                return Err(RecordError::validation(
                    "evaluation_response",
                    format!("record {} is scored without an evaluation response", raw.id),
                ))
            }
            (_, Some(_), None) => {
                return Err(RecordError::validation(
                    "score",
                    format!("record {} has an evaluation response but no score", raw.id),
                ))
            }
        };
        let tags = tidy_stored_tags(&raw.tags);
        if tags != raw.tags {
            tracing::warn!(
                event = "stored_tags_tidied",
                id = %id,
                before = ?raw.tags,
                after = ?tags
            );
        }
        Ok(Self {
            id,
            date,
            prompt: raw.prompt,
            response: raw.response,
            tags,
            notes: raw.notes,
            evaluation,
        })
    }
}

/// Tags in files written by older tools may be padded, empty or repeated.
/// They are cleaned on load instead of failing the whole directory.
fn tidy_stored_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let stripped: String = tag.chars().filter(|c| !c.is_control()).collect();
        let clean = stripped.trim();
        if !clean.is_empty() && !out.iter().any(|t| t == clean) {
            out.push(clean.to_string());
        }
    }
    out
}

impl From<EvaluationRecord> for RecordFile {
    fn from(rec: EvaluationRecord) -> Self {
        let (evaluation_prompt, evaluation_response, score) = match rec.evaluation {
            Evaluation::Pending => (None, None, None),
            Evaluation::PromptReady { prompt } => (Some(prompt), None, None),
            Evaluation::Scored {
                prompt,
                response,
                score,
            } => (prompt, Some(response), Some(score)),
        };
        Self {
            id: rec.id.to_string(),
            date: format_date(rec.date),
            prompt: rec.prompt,
            response: rec.response,
            tags: rec.tags,
            notes: rec.notes,
            evaluation_prompt,
            evaluation_response,
            score,
        }
    }
}
