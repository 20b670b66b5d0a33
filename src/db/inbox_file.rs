use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CloError;

use super::records::Persist;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// The inbox file: one captured entry per line, no envelope.
pub struct TextLines {
    path: PathBuf,
}

impl TextLines {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persist<String> for TextLines {
    fn load(&self) -> Vec<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let lines: Vec<String> = contents
                    .lines()
                    .map(|l| l.trim_end().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                debug!(path = %self.path.display(), count = lines.len(), "loaded inbox");
                lines
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "inbox unreadable, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, lines: &[String]) -> Result<(), CloError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = fs::File::create(&self.path)?;
        for line in lines {
            file.write_all(line.as_bytes())?;
            file.write_all(LINE_ENDING.as_bytes())?;
        }
        file.flush()?;
        debug!(path = %self.path.display(), count = lines.len(), "saved inbox");
        Ok(())
    }
}
