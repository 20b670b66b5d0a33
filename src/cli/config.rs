use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_TASK_FILE: &str = "tasks.db";
pub const DEFAULT_PROJECT_FILE: &str = "projects.db";
pub const DEFAULT_INBOX_FILE: &str = "inbox.txt";

/// Optional overrides read from `<data dir>/config.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub task_file: Option<PathBuf>,
    pub project_file: Option<PathBuf>,
    pub inbox_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub task_file: PathBuf,
    pub project_file: PathBuf,
    pub inbox_file: PathBuf,
}

/// Default data directory: `~/.clo`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".clo"))
}

pub fn load_file_config(data_dir: &Path) -> Result<FileConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Work out where each collection lives: `--file` beats config.json, which
/// beats the defaults. Relative config entries are taken from the data
/// directory.
pub fn resolve(dir: Option<&Path>, task_file: Option<&Path>) -> Result<Paths> {
    let data_dir = match dir {
        Some(d) => d.to_path_buf(),
        None => default_data_dir()
            .ok_or_else(|| anyhow!("cannot determine a home directory; pass --dir"))?,
    };
    let config = load_file_config(&data_dir)?;

    let in_dir = |configured: Option<PathBuf>, default: &str| -> PathBuf {
        match configured {
            Some(p) if p.is_absolute() => p,
            Some(p) => data_dir.join(p),
            None => data_dir.join(default),
        }
    };

    let task_file = match task_file {
        Some(f) => f.to_path_buf(),
        None => in_dir(config.task_file, DEFAULT_TASK_FILE),
    };
    let project_file = in_dir(config.project_file, DEFAULT_PROJECT_FILE);
    let inbox_file = in_dir(config.inbox_file, DEFAULT_INBOX_FILE);

    Ok(Paths {
        data_dir,
        task_file,
        project_file,
        inbox_file,
    })
}
