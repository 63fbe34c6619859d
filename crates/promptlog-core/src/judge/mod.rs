pub mod score;
pub mod template;

pub use score::extract_score;
pub use template::{render, JudgeTemplate, TemplateSource};

use crate::errors::{RecordError, RecordResult};
use crate::model::{EvaluationRecord, EvaluationUpdate, RecordId, Score};
use crate::storage::RecordStore;

/// How the score of a verdict is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Given(Score),
    /// Parse it out of the verdict text.
    Extract,
}

#[derive(Debug, Clone)]
pub struct Verdict {
    pub response: String,
    pub score: ScoreSource,
}

/// Outcome of recording a verdict.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub record: EvaluationRecord,
    pub score: Score,
    pub extracted: bool,
}

/// Drives the two evaluation steps of a record: rendering the judge prompt
/// and recording the judge's verdict.
#[derive(Clone)]
pub struct JudgeService {
    store: RecordStore,
}

impl JudgeService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Renders the judge prompt for `id` and stores it on the record.
    ///
    /// Calling this again re-renders and overwrites the stored judge prompt;
    /// a verdict already on the record is kept.
    pub fn prepare(&self, id: &RecordId, source: &TemplateSource) -> RecordResult<String> {
        let record = self.store.read(id)?;
        let rendered = render(source, &record)?;

        let prompt = rendered.clone();
        self.store.update(id, move |rec| {
            rec.evaluation = EvaluationUpdate::JudgePrompt(prompt).apply(&rec.evaluation)?;
            Ok(())
        })?;

        tracing::info!(event = "judge_prompt_stored", id = %id, chars = rendered.len());
        Ok(rendered)
    }

    /// Stores the verdict text and score. An existing verdict is only
    /// replaced when `force` is set.
    pub fn record_verdict(
        &self,
        id: &RecordId,
        verdict: Verdict,
        force: bool,
    ) -> RecordResult<Recorded> {
        if verdict.response.trim().is_empty() {
            return Err(RecordError::validation(
                "evaluation_response",
                "evaluation response is required",
            ));
        }
        let (score, extracted) = match verdict.score {
            ScoreSource::Given(score) => (score, false),
            ScoreSource::Extract => {
                let score = extract_score(&verdict.response).ok_or_else(|| {
                    RecordError::validation(
                        "score",
                        "could not automatically extract score from the evaluation response",
                    )
                })?;
                (score, true)
            }
        };

        let record = self.store.update(id, |rec| {
            if rec.evaluation.is_scored() && !force {
                return Err(RecordError::validation(
                    "score",
                    format!("record {} is already evaluated (use --force to overwrite)", rec.id),
                ));
            }
            rec.evaluation = EvaluationUpdate::Verdict {
                response: verdict.response,
                score,
            }
            .apply(&rec.evaluation)?;
            Ok(())
        })?;

        tracing::info!(event = "verdict_recorded", id = %id, score = score.value(), extracted);
        Ok(Recorded {
            record,
            score,
            extracted,
        })
    }
}
