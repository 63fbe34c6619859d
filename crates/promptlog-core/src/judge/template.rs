use crate::errors::{RecordError, RecordResult};
use crate::model::{format_date, EvaluationRecord};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_TEMPLATE_NAME: &str = "judge_prompt.txt";

pub const DEFAULT_JUDGE_TEMPLATE: &str = r#"You are reviewing a prompt sent to an AI coding assistant and the response it produced.

PROMPT:
{{prompt}}

RESPONSE:
{{response}}

TAGS: {{tags}}
NOTES: {{notes}}

Rate how well the response serves the prompt on a scale of 1 to 5:
1 = unusable, 2 = poor, 3 = adequate, 4 = good, 5 = excellent.

Answer with a first line of the form "Score: N", followed by your reasoning.
"#;

const REQUIRED: [&str; 2] = ["prompt", "response"];
const KNOWN: [&str; 6] = ["prompt", "response", "tags", "notes", "id", "date"];

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex")
    })
}

/// Where a judge template comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    File(PathBuf),
    Inline { name: String, text: String },
}

impl TemplateSource {
    /// A bare name is looked up in `templates_dir`; anything that looks like
    /// a path is used as given.
    pub fn resolve(templates_dir: &Path, name_or_path: &str) -> Self {
        let p = Path::new(name_or_path);
        if p.is_absolute() || p.components().count() > 1 {
            Self::File(p.to_path_buf())
        } else {
            Self::File(templates_dir.join(p))
        }
    }

    pub fn builtin() -> Self {
        Self::Inline {
            name: "builtin:judge_prompt".into(),
            text: DEFAULT_JUDGE_TEMPLATE.into(),
        }
    }

    pub fn load(&self) -> RecordResult<JudgeTemplate> {
        match self {
            Self::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        RecordError::TemplateNotFound { path: path.clone() }
                    } else {
                        RecordError::io(path, "failed to read template", e)
                    }
                })?;
                JudgeTemplate::parse(path.display().to_string(), text)
            }
            Self::Inline { name, text } => JudgeTemplate::parse(name.clone(), text.clone()),
        }
    }
}

/// A checked judge template: every placeholder is known and both
/// `{{prompt}}` and `{{response}}` appear.
#[derive(Debug, Clone)]
pub struct JudgeTemplate {
    name: String,
    text: String,
}

impl JudgeTemplate {
    pub fn parse(name: impl Into<String>, text: impl Into<String>) -> RecordResult<Self> {
        let name = name.into();
        let text = text.into();
        let err = |message: String| RecordError::Template {
            template: name.clone(),
            message,
        };

        let mut seen = Vec::new();
        for cap in placeholder_re().captures_iter(&text) {
            let key = &cap[1];
            if !KNOWN.contains(&key) {
                let start = cap.get(0).map_or(0, |m| m.start());
                let line = text[..start].matches('\n').count() + 1;
                return Err(err(format!(
                    "unknown placeholder '{}' on line {} (known: {})",
                    &cap[0],
                    line,
                    KNOWN.join(", ")
                )));
            }
            seen.push(key.to_string());
        }

        let leftover = placeholder_re().replace_all(&text, "");
        if leftover.contains("{{") || leftover.contains("}}") {
            return Err(err("malformed or unterminated placeholder".into()));
        }

        for required in REQUIRED {
            if !seen.iter().any(|k| k == required) {
                return Err(err(format!("missing required placeholder {{{{{}}}}}", required)));
            }
        }

        Ok(Self { name, text })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitutes record values literally; substituted text is never
    /// re-scanned for placeholders.
    pub fn render(&self, record: &EvaluationRecord) -> String {
        placeholder_re()
            .replace_all(&self.text, |cap: &Captures<'_>| match &cap[1] {
                "prompt" => record.prompt.clone(),
                "response" => record.response.clone(),
                "tags" => record.tags.join(", "),
                "notes" => record.notes.clone(),
                "id" => record.id.to_string(),
                "date" => format_date(record.date),
                // parse() rejected everything else
                _ => cap[0].to_string(),
            })
            .into_owned()
    }
}

/// Loads `source` and expands it for `record`. No side effects.
pub fn render(source: &TemplateSource, record: &EvaluationRecord) -> RecordResult<String> {
    let template = source.load()?;
    Ok(template.render(record))
}
