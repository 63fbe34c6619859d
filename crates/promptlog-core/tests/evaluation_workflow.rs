use chrono::NaiveDate;
use promptlog_core::judge::{JudgeService, ScoreSource, TemplateSource, Verdict};
use promptlog_core::query::RecordFilter;
use promptlog_core::{Journal, NewEntry, RecordStore, Score};
use tempfile::tempdir;

fn entry(prompt: &str, tags: &[&str]) -> NewEntry {
    NewEntry {
        prompt: prompt.into(),
        response: format!("response to {prompt}"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        notes: String::new(),
    }
}

#[test]
fn log_evaluate_list_scenario() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = RecordStore::open(&dir.path().join("records"))?;
    let journal = Journal::new(store.clone());
    let judge = JudgeService::new(store);
    let day = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();

    let first = journal.log(day, entry("P1", &[]))?;
    let second = journal.log(day, entry("P2", &[]))?;
    assert_eq!(first.id.to_string(), "2025-05-17-001");
    assert_eq!(second.id.to_string(), "2025-05-17-002");

    judge.record_verdict(
        &first.id,
        Verdict {
            response: "Score: 5\nExcellent.".into(),
            score: ScoreSource::Given(Score::new(5)?),
        },
        false,
    )?;

    let listed = journal.list(&RecordFilter {
        min_score: Some(4),
        ..Default::default()
    })?;
    let ids: Vec<String> = listed.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["2025-05-17-001"]);
    Ok(())
}

#[test]
fn template_then_verdict_fills_all_evaluation_fields() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates)?;
    std::fs::write(
        templates.join("judge_prompt.txt"),
        "Evaluate this prompt:\n\nPROMPT:\n{{prompt}}\n\nRESPONSE:\n{{response}}\n",
    )?;

    let store = RecordStore::open(&dir.path().join("records"))?;
    let journal = Journal::new(store.clone());
    let judge = JudgeService::new(store);
    let day = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
    let rec = journal.log(day, entry("Test prompt for evaluation", &["test"]))?;

    let source = TemplateSource::resolve(&templates, "judge_prompt.txt");
    let rendered = judge.prepare(&rec.id, &source)?;
    assert!(rendered.contains("Test prompt for evaluation"));
    assert!(rendered.contains("response to Test prompt for evaluation"));

    let recorded = judge.record_verdict(
        &rec.id,
        Verdict {
            response: "Rating: 4".into(),
            score: ScoreSource::Extract,
        },
        false,
    )?;
    let stored = journal.get(&rec.id)?;
    assert_eq!(stored, recorded.record);
    assert_eq!(stored.evaluation.prompt(), Some(rendered.as_str()));
    assert_eq!(stored.evaluation.response(), Some("Rating: 4"));
    assert_eq!(stored.score().map(|s| s.value()), Some(4));
    Ok(())
}

#[test]
fn listing_by_tag_is_ordered_by_id() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let journal = Journal::new(RecordStore::open(dir.path())?);
    let d1 = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
    let d0 = d1.pred_opt().unwrap();

    journal.log(d1, entry("late", &["a"]))?;
    journal.log(d0, entry("early", &["a", "b"]))?;
    journal.log(d1, entry("untagged", &[]))?;

    let listed = journal.list(&RecordFilter {
        tag: Some("a".into()),
        ..Default::default()
    })?;
    let ids: Vec<String> = listed.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["2025-05-16-001", "2025-05-17-001"]);
    Ok(())
}
