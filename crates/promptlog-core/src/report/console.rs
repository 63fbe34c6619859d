use crate::model::{format_date, EvaluationRecord};

const PROMPT_PREVIEW_CHARS: usize = 50;
const HEADERS: [&str; 5] = ["ID", "DATE", "SCORE", "TAGS", "PROMPT"];

pub fn format_table(records: &[EvaluationRecord]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                format_date(r.date),
                r.score().map_or_else(|| "-".to_string(), |s| s.to_string()),
                r.tags.join(", "),
                preview(&r.prompt),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("  ").trim_end());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

pub fn format_json(records: &[EvaluationRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

pub fn print_summary(records: &[EvaluationRecord]) {
    let scored = records.iter().filter(|r| r.evaluation.is_scored()).count();
    eprintln!(
        "Records: total={} scored={} unscored={}",
        records.len(),
        scored,
        records.len() - scored
    );
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// First line of the prompt, cut to a fixed number of characters.
fn preview(text: &str) -> String {
    let first = text.lines().next().unwrap_or("").trim();
    let mut chars = first.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() || text.trim().lines().nth(1).is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Evaluation, RecordId, Score};
    use chrono::NaiveDate;

    fn rec(seq: u16, prompt: &str, score: Option<i64>) -> EvaluationRecord {
        let id = RecordId::new(NaiveDate::from_ymd_opt(2025, 5, 17).unwrap(), seq).unwrap();
        let mut r = EvaluationRecord::new(id, prompt, "r", vec!["a".into(), "b".into()], "").unwrap();
        if let Some(s) = score {
            r.evaluation = Evaluation::Scored {
                prompt: None,
                response: "ok".into(),
                score: Score::new(s).unwrap(),
            };
        }
        r
    }

    #[test]
    fn table_has_header_and_rows() {
        let out = format_table(&[rec(1, "P1", Some(5)), rec(2, "P2", None)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].starts_with("2025-05-17-001  2025-05-17  5"));
        assert!(lines[3].contains("-      a, b  P2"));
    }

    #[test]
    fn long_prompts_are_cut() {
        let long = "x".repeat(80);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(PROMPT_PREVIEW_CHARS)));
        assert_eq!(preview("line one\nline two"), "line one...");
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn json_is_an_array_of_records() {
        let out = format_json(&[rec(1, "P1", Some(4))]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["id"], "2025-05-17-001");
        assert_eq!(v[0]["score"], 4);
    }
}
