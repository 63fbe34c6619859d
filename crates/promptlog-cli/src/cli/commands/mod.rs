use super::args::*;
use promptlog_core::config::{self, Overrides, Settings};
use promptlog_core::errors::{ConfigError, ErrorKind, RecordError};
use promptlog_core::RecordStore;
use std::path::PathBuf;

pub mod evaluate;
pub mod init;
pub mod list;
pub mod log;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const CONFIG_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const VALIDATION: i32 = 4;
    pub const STORAGE: i32 = 5;
    pub const TEMPLATE: i32 = 6;
}

/// Settings shared by every command, resolved once per invocation.
pub struct Context {
    pub settings: Settings,
    /// Where `init --config-file` writes the sample config.
    pub config_target: PathBuf,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> anyhow::Result<Self> {
        let home = config::home_dir();
        let located = config::locate_config(global.config.as_deref(), &home)?;
        let file = match &located {
            Some(path) => Some(config::load_config(path)?),
            None => None,
        };

        let overrides = Overrides {
            records_dir: global.records_dir.clone(),
            templates_dir: global.templates_dir.clone(),
        };
        let settings = config::resolve_settings(file.as_ref(), &overrides, &home);
        tracing::debug!(
            event = "settings_resolved",
            config = ?located,
            records_dir = %settings.records_dir.display(),
            templates_dir = %settings.templates_dir.display(),
            default_template = %settings.default_template
        );

        let config_target = global
            .config
            .clone()
            .unwrap_or_else(|| home.join(config::CONFIG_FILE_NAME));
        Ok(Self {
            settings,
            config_target,
        })
    }

    pub fn store(&self) -> Result<RecordStore, RecordError> {
        RecordStore::open(&self.settings.records_dir)
    }
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    if let Command::Version = cli.cmd {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(exit_codes::OK);
    }

    let ctx = Context::load(&cli.global)?;
    match cli.cmd {
        Command::Log(args) => log::cmd_log(&ctx, args),
        Command::Evaluate(args) => evaluate::cmd_evaluate(&ctx, args),
        Command::List(args) => list::cmd_list(&ctx, args),
        Command::Show(args) => list::cmd_show(&ctx, args),
        Command::Init(args) => init::cmd_init(&ctx, args),
        Command::Version => Ok(exit_codes::OK),
    }
}

pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => exit_codes::NOT_FOUND,
        ErrorKind::Validation => exit_codes::VALIDATION,
        // a collision only escapes the core once retries are exhausted
        ErrorKind::Storage | ErrorKind::IdCollision => exit_codes::STORAGE,
        ErrorKind::Template => exit_codes::TEMPLATE,
    }
}

/// Prints a failed command's error and picks the process exit code.
pub fn report_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<RecordError>() {
        let kind = e.kind();
        tracing::debug!(event = "command_failed", kind = kind.as_str(), error = ?e);
        eprintln!("error [{}]: {}", kind.as_str(), e);
        return exit_code_for(kind);
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        eprintln!("{e}");
        return exit_codes::CONFIG_ERROR;
    }
    eprintln!("fatal: {err:?}");
    exit_codes::CONFIG_ERROR
}
