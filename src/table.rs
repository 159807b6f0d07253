//! Typed in-memory tables loaded from uploaded CSV files.
//!
//! Each uploaded file becomes one [`Table`] named after the file, with an
//! ordered set of columns whose kind ({numeric, text}) is inferred from the
//! cell values at load time. Tables are session-scoped and never touch disk.

use csv::ReaderBuilder;

use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Table {
    /// Original upload filename.
    pub name: String,
    pub columns: Vec<Column>,
    /// Cells stored as text; `columns[i].kind` says how to interpret column i.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse one CSV byte stream into a table. The first record is the header.
    pub fn from_csv(name: &str, data: &[u8]) -> AppResult<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(data);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| AppError::Parse {
                file: name.to_string(),
                detail: e.to_string(),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() {
            return Err(AppError::Parse {
                file: name.to_string(),
                detail: "file has no header row".to_string(),
            });
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| AppError::Parse {
                file: name.to_string(),
                detail: e.to_string(),
            })?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        let columns = infer_columns(&headers, &rows);

        Ok(Self {
            name: name.to_string(),
            columns,
            rows,
        })
    }

    /// First `n` rows, for the UI preview.
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(n)]
    }

    /// One summary line: the table name and up to `cap` column names, in order.
    pub fn summary_line(&self, cap: usize) -> String {
        let cols: Vec<&str> = self
            .columns
            .iter()
            .take(cap)
            .map(|c| c.name.as_str())
            .collect();
        format!("- File: '{}' | Columns: {}", self.name, cols.join(", "))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Render the table back to CSV text, capped at `max_rows` data rows.
    /// Used to hand table contents to the agent over the wire.
    pub fn to_csv_text(&self, max_rows: usize) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        let _ = wtr.write_record(self.columns.iter().map(|c| c.name.as_str()));
        for row in self.rows.iter().take(max_rows) {
            let _ = wtr.write_record(row);
        }
        let data = wtr.into_inner().unwrap_or_default();
        String::from_utf8_lossy(&data).into_owned()
    }
}

/// A column is numeric when every non-empty cell parses as f64 and at least
/// one cell is non-empty. Everything else is text.
fn infer_columns(headers: &[String], rows: &[Vec<String>]) -> Vec<Column> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut non_empty = 0usize;
            let mut all_numeric = true;
            for row in rows {
                if let Some(cell) = row.get(idx) {
                    let cell = cell.trim();
                    if cell.is_empty() {
                        continue;
                    }
                    non_empty += 1;
                    if cell.parse::<f64>().is_err() {
                        all_numeric = false;
                        break;
                    }
                }
            }
            let kind = if non_empty > 0 && all_numeric {
                ColumnKind::Numeric
            } else {
                ColumnKind::Text
            };
            Column {
                name: name.clone(),
                kind,
            }
        })
        .collect()
}

/// One file that failed to parse; the others are unaffected.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParseFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub tables: Vec<Table>,
    pub failures: Vec<ParseFailure>,
}

/// Parse uploaded files into tables in upload order. A malformed file is
/// reported as a failure naming itself without aborting the rest. Zero files
/// yields an empty outcome.
pub fn load_tables(files: &[(String, Vec<u8>)]) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    for (name, data) in files {
        match Table::from_csv(name, data) {
            Ok(table) => outcome.tables.push(table),
            Err(err) => outcome.failures.push(ParseFailure {
                file: name.clone(),
                error: err.to_string(),
            }),
        }
    }
    outcome
}
