use unicode_width::UnicodeWidthStr;

/// A block of rows under a shared header, rendered as an ASCII grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Values of one column, by header name.
    pub fn column(&self, header: &str) -> Vec<&str> {
        match self.headers.iter().position(|h| h == header) {
            Some(i) => self
                .rows
                .iter()
                .map(|r| r.get(i).map(String::as_str).unwrap_or(""))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.width())
                    .chain(std::iter::once(h.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let border = {
            let mut s = String::from("+");
            for w in &widths {
                s.push_str(&"-".repeat(w + 2));
                s.push('+');
            }
            s
        };

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&render_line(&self.headers, &widths));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
            out.push('\n');
        }
        if !self.rows.is_empty() {
            out.push_str(&border);
        } else {
            out.pop();
        }
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let pad = w - cell.width();
        s.push(' ');
        s.push_str(cell);
        s.push_str(&" ".repeat(pad + 1));
        s.push('|');
    }
    s
}

/// Indent a description by `depth` levels for nested subtask rows.
pub fn indent(text: &str, depth: usize) -> String {
    format!("{}{}", "  ".repeat(depth), text)
}
