use std::path::{Path, PathBuf};

/// Resolves paths written in a config file relative to that file's directory.
#[derive(Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config_path: &Path) -> Self {
        let base_dir = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Self { base_dir }
    }

    pub fn resolve_opt_str(&self, p: &mut Option<String>) {
        let Some(s) = p.as_mut() else { return };
        if s.trim().is_empty() {
            return;
        }
        *s = self.resolve(Path::new(s.as_str())).to_string_lossy().to_string();
    }

    /// Absolute paths are returned unchanged, `~/` expands to the home
    /// directory, anything else is joined onto the config directory.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if let Ok(rest) = p.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.join_clean(p)
    }

    fn join_clean(&self, rel: &Path) -> PathBuf {
        let joined = self.base_dir.join(rel);

        let mut out = PathBuf::new();
        for c in joined.components() {
            use std::path::Component::*;
            match c {
                CurDir => {}
                ParentDir => {
                    out.pop();
                }
                RootDir | Prefix(_) | Normal(_) => out.push(c.as_os_str()),
            }
        }
        out
    }
}
