use super::{exit_codes, Context};
use crate::cli::args::InitArgs;
use promptlog_core::config::write_sample_config;
use promptlog_core::judge::template::DEFAULT_JUDGE_TEMPLATE;
use promptlog_core::judge::TemplateSource;
use std::path::Path;

pub fn cmd_init(ctx: &Context, args: InitArgs) -> anyhow::Result<i32> {
    let store = ctx.store()?;
    eprintln!("records directory: {}", store.dir().display());

    let source = TemplateSource::resolve(
        &ctx.settings.templates_dir,
        &ctx.settings.default_template,
    );
    if let TemplateSource::File(path) = &source {
        write_file_if_missing(path, DEFAULT_JUDGE_TEMPLATE)?;
    }

    if args.config_file {
        let path = &ctx.config_target;
        if path.exists() {
            eprintln!("note: {} already exists (skipped)", path.display());
        } else {
            ensure_parent_dir(path)?;
            write_sample_config(path)?;
            eprintln!("created {}", path.display());
        }
    }

    Ok(exit_codes::OK)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if path.exists() {
        eprintln!("note: {} already exists (skipped)", path.display());
        return Ok(());
    }
    ensure_parent_dir(path)?;
    std::fs::write(path, content)?;
    eprintln!("created {}", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
