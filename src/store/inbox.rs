use tracing::debug;

use crate::db::Persist;
use crate::error::CloError;
use crate::output::text::Table;

/// Captured free-text lines waiting to be processed, oldest first.
pub struct Inbox {
    lines: Vec<String>,
    source: Box<dyn Persist<String>>,
}

impl Inbox {
    pub fn load(source: Box<dyn Persist<String>>) -> Self {
        let lines = source.load();
        debug!(count = lines.len(), "inbox ready");
        Self { lines, source }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Position of `line` nearest to `hint`, earlier positions first on a
    /// tie. Locates an item again after other lines moved around it.
    pub fn position_near(&self, hint: usize, line: &str) -> Option<usize> {
        let len = self.lines.len();
        let matches = |i: usize| i < len && self.lines[i] == line;
        (0..=hint.max(len)).find_map(|d| {
            let below = hint.checked_sub(d).filter(|&i| matches(i));
            below.or_else(|| Some(hint + d).filter(|&i| d > 0 && matches(i)))
        })
    }

    pub fn add(&mut self, line: &str) -> Result<(), CloError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CloError::invalid_value("Nothing to add to the inbox"));
        }
        self.lines.push(line.to_string());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, CloError> {
        if index >= self.lines.len() {
            return Err(CloError::index_out_of_range(index, self.lines.len()));
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn display(&self) -> Table {
        let mut table = Table::new(&["Index", "Item"]);
        for (index, line) in self.lines.iter().enumerate() {
            table.add_row(vec![index.to_string(), line.clone()]);
        }
        table
    }

    pub fn close(&self) -> Result<(), CloError> {
        self.source.save(&self.lines)
    }
}
