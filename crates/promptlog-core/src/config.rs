use crate::errors::ConfigError;
use crate::judge::template::DEFAULT_TEMPLATE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const HOME_DIR_NAME: &str = ".promptlog";

/// Contents of the optional YAML config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub records_dir: Option<String>,
    #[serde(default)]
    pub templates_dir: Option<String>,
    #[serde(default)]
    pub default_template: Option<String>,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

/// Fully resolved settings used by the commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub records_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub default_template: String,
}

/// Values given on the command line or through the environment. They win
/// over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub records_dir: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let mut cfg: FileConfig = serde_yaml::from_str(&raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML in {}: {}", path.display(), e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if let Some(name) = &cfg.default_template {
        if name.trim().is_empty() {
            return Err(ConfigError("default_template must not be empty".into()));
        }
    }

    let r = path_resolver::PathResolver::new(path);
    r.resolve_opt_str(&mut cfg.records_dir);
    r.resolve_opt_str(&mut cfg.templates_dir);

    Ok(cfg)
}

/// `~/.promptlog`, or `.promptlog` in the working directory when there is no
/// home directory.
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HOME_DIR_NAME)
}

/// Picks the config file: an explicit path must exist, the default location
/// is only used when present.
pub fn locate_config(explicit: Option<&Path>, home: &Path) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(p) if p.is_file() => Ok(Some(p.to_path_buf())),
        Some(p) => Err(ConfigError(format!("config file not found: {}", p.display()))),
        None => {
            let candidate = home.join(CONFIG_FILE_NAME);
            Ok(candidate.is_file().then_some(candidate))
        }
    }
}

/// Flags and env beat the config file, which beats the defaults under `home`.
pub fn resolve_settings(
    file: Option<&FileConfig>,
    overrides: &Overrides,
    home: &Path,
) -> Settings {
    let records_dir = overrides
        .records_dir
        .clone()
        .or_else(|| file.and_then(|c| c.records_dir.as_deref()).map(PathBuf::from))
        .unwrap_or_else(|| home.join("records"));
    let templates_dir = overrides
        .templates_dir
        .clone()
        .or_else(|| file.and_then(|c| c.templates_dir.as_deref()).map(PathBuf::from))
        .unwrap_or_else(|| home.join("templates"));
    let default_template = file
        .and_then(|c| c.default_template.clone())
        .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string());

    Settings {
        records_dir,
        templates_dir,
        default_template,
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"version: 1
# relative paths are resolved against this file's directory
records_dir: records
templates_dir: templates
default_template: judge_prompt.txt
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
