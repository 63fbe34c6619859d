use super::{exit_codes, Context};
use crate::cli::args::EvaluateArgs;
use promptlog_core::errors::RecordError;
use promptlog_core::journal::lookup_id;
use promptlog_core::judge::{JudgeService, ScoreSource, TemplateSource, Verdict};
use promptlog_core::Score;

pub fn cmd_evaluate(ctx: &Context, args: EvaluateArgs) -> anyhow::Result<i32> {
    let id = lookup_id(&args.id)?;
    let judge = JudgeService::new(ctx.store()?);

    if args.generate_template {
        let name = args
            .template
            .as_deref()
            .unwrap_or(&ctx.settings.default_template);
        let source = TemplateSource::resolve(&ctx.settings.templates_dir, name);
        let rendered = judge.prepare(&id, &source)?;

        eprintln!("Judge prompt for {} (stored on the record):", id);
        println!("{}", rendered);
        eprintln!(
            "Next: promptlog evaluate {} --response \"<verdict>\" --score <1-5>",
            id
        );
        return Ok(exit_codes::OK);
    }

    let response = args.response.ok_or_else(|| {
        RecordError::validation("evaluation_response", "evaluation response is required")
    })?;
    let score = if args.auto_extract_score {
        ScoreSource::Extract
    } else {
        let raw = args.score.ok_or_else(|| {
            RecordError::validation(
                "score",
                "score is required (pass --score or --auto-extract-score)",
            )
        })?;
        ScoreSource::Given(raw.parse::<Score>()?)
    };

    let recorded = judge.record_verdict(&id, Verdict { response, score }, args.force)?;
    if recorded.extracted {
        println!("Auto-extracted score: {}", recorded.score);
    }
    println!(
        "Evaluation saved for ID: {} (score {})",
        recorded.record.id, recorded.score
    );
    Ok(exit_codes::OK)
}
