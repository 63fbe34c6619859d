use super::{exit_codes, Context};
use crate::cli::args::LogArgs;
use promptlog_core::model::parse_date;
use promptlog_core::{Journal, NewEntry};

pub fn cmd_log(ctx: &Context, args: LogArgs) -> anyhow::Result<i32> {
    let date = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let journal = Journal::new(ctx.store()?);
    let record = journal.log(
        date,
        NewEntry {
            prompt: args.prompt,
            response: args.response,
            tags: args.tags,
            notes: args.notes,
        },
    )?;

    println!("Prompt logged with ID: {}", record.id);
    println!(
        "Saved to: {}",
        journal.store().record_path(&record.id).display()
    );
    Ok(exit_codes::OK)
}
