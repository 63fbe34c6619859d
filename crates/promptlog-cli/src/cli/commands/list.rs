use super::{exit_codes, Context};
use crate::cli::args::{ListArgs, OutputFormat, ShowArgs};
use promptlog_core::journal::lookup_id;
use promptlog_core::query::RecordFilter;
use promptlog_core::report::console;
use promptlog_core::{Journal, RecordResult, Score};

pub fn cmd_list(ctx: &Context, args: ListArgs) -> anyhow::Result<i32> {
    let filter = RecordFilter {
        tag: args.tag,
        min_score: parse_bound(args.min_score.as_deref())?,
        max_score: parse_bound(args.max_score.as_deref())?,
    };
    let records = Journal::new(ctx.store()?).list(&filter)?;

    match args.format {
        OutputFormat::Json => println!("{}", console::format_json(&records)?),
        OutputFormat::Table if records.is_empty() => eprintln!("No records found."),
        OutputFormat::Table => {
            print!("{}", console::format_table(&records));
            console::print_summary(&records);
        }
    }
    Ok(exit_codes::OK)
}

pub fn cmd_show(ctx: &Context, args: ShowArgs) -> anyhow::Result<i32> {
    let id = lookup_id(&args.id)?;
    let record = Journal::new(ctx.store()?).get(&id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(exit_codes::OK)
}

/// Bounds go through `Score` so a bad bound is a validation failure like
/// any other bad score.
fn parse_bound(raw: Option<&str>) -> RecordResult<Option<u8>> {
    raw.map(|s| s.parse::<Score>().map(|score| score.value()))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlog_core::ErrorKind;

    #[test]
    fn bounds_parse_like_scores() {
        assert_eq!(parse_bound(None).unwrap(), None);
        assert_eq!(parse_bound(Some("4")).unwrap(), Some(4));
        for bad in ["3.5", "-1", "0", "6", "high"] {
            let err = parse_bound(Some(bad)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{bad}");
        }
    }
}
