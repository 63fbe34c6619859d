use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "promptlog",
    version,
    about = "Log prompt/response pairs and grade them with a judge prompt"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// config file (default: ~/.promptlog/config.yaml when it exists)
    #[arg(long, global = true, env = "PROMPTLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// directory holding one JSON file per record
    #[arg(long, global = true, env = "PROMPTLOG_RECORDS_DIR")]
    pub records_dir: Option<PathBuf>,

    /// directory searched for named judge templates
    #[arg(long, global = true, env = "PROMPTLOG_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// tracing filter directive, e.g. `info` or `promptlog_core=debug`
    #[arg(long, global = true, env = "PROMPTLOG_LOG", default_value = "warn")]
    pub log_level: String,

    /// emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record a new prompt/response pair
    Log(LogArgs),
    /// Render the judge prompt for a record, or store the judge's verdict
    Evaluate(EvaluateArgs),
    /// List records, optionally filtered by tag and score
    List(ListArgs),
    /// Print one record as JSON
    Show(ShowArgs),
    /// Create the records directory and the default judge template
    Init(InitArgs),
    Version,
}

#[derive(Parser, Clone, Debug)]
pub struct LogArgs {
    #[arg(short, long)]
    pub prompt: String,

    #[arg(short, long)]
    pub response: String,

    #[arg(short, long, num_args = 1..)]
    pub tags: Vec<String>,

    #[arg(short, long, default_value = "")]
    pub notes: String,

    /// record date as YYYY-MM-DD (default: today, local time)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Parser, Clone, Debug)]
pub struct EvaluateArgs {
    pub id: String,

    /// render the judge prompt, store it on the record and print it
    #[arg(
        short = 'g',
        long,
        conflicts_with_all = ["response", "score", "auto_extract_score", "force"]
    )]
    pub generate_template: bool,

    /// template name (looked up in the templates directory) or path
    #[arg(long, requires = "generate_template")]
    pub template: Option<String>,

    /// the judge's verdict text
    #[arg(short, long)]
    pub response: Option<String>,

    /// integer score from 1 to 5
    #[arg(short, long, conflicts_with = "auto_extract_score")]
    pub score: Option<String>,

    /// take the score from the verdict text ("Score: 4", "4/5", ...)
    #[arg(long)]
    pub auto_extract_score: bool,

    /// replace an existing verdict
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ListArgs {
    #[arg(short, long)]
    pub tag: Option<String>,

    /// lowest score to include (1-5)
    #[arg(long, allow_negative_numbers = true)]
    pub min_score: Option<String>,

    /// highest score to include (1-5)
    #[arg(long, allow_negative_numbers = true)]
    pub max_score: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Clone, Debug)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Parser, Clone, Debug)]
pub struct InitArgs {
    /// also write a sample config.yaml next to the records directory
    #[arg(long)]
    pub config_file: bool,
}
