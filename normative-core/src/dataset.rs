//! In-memory tabular dataset and a CSV loader for it.
//!
//! Values are held as trimmed strings. Every column is treated as categorical:
//! numbers are compared by their textual form, which is what the discretised
//! datasets this audit targets contain.

use crate::error::DatasetError;
use std::collections::HashMap;
use std::path::Path;

/// A read-only, column-major table of categorical values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<Vec<String>>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from a header and row-major records.
    ///
    /// Header names and values are trimmed. Fails on duplicate header names or
    /// rows whose width differs from the header.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        let columns: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DatasetError::DuplicateColumn(name.clone()));
            }
        }

        let mut values: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DatasetError::RaggedRow {
                    row: row_idx + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            for (col, value) in values.iter_mut().zip(row) {
                col.push(value.trim().to_string());
            }
        }

        let row_count = values.first().map_or(0, Vec::len);
        Ok(Self {
            columns,
            index,
            values,
            row_count,
        })
    }

    /// Build a dataset from named columns of equal length.
    pub fn from_columns<N, V>(columns: Vec<(N, Vec<V>)>) -> Result<Self, DatasetError>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut header = Vec::with_capacity(columns.len());
        let mut data: Vec<Vec<String>> = Vec::with_capacity(columns.len());
        for (name, col) in columns {
            header.push(name.into());
            data.push(col.into_iter().map(Into::into).collect());
        }
        let height = data.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = Vec::with_capacity(height);
        for r in 0..height {
            let row = data
                .iter()
                .map(|col| col.get(r).cloned())
                .collect::<Option<Vec<String>>>();
            match row {
                Some(row) => rows.push(row),
                None => {
                    return Err(DatasetError::RaggedRow {
                        row: r + 1,
                        expected: header.len(),
                        found: data.iter().filter(|c| c.len() > r).count(),
                    });
                }
            }
        }
        Self::from_rows(header, rows)
    }

    /// Parse comma-separated text whose first non-blank record is the header.
    ///
    /// A quoted field may span several lines; its line breaks are kept.
    pub fn from_csv_str(content: &str) -> Result<Self, DatasetError> {
        let mut records = Vec::new();
        // Start line and text of a record whose quoted field is still open
        let mut pending: Option<(usize, String)> = None;

        for (i, line) in content.lines().enumerate() {
            let (start, record) = match pending.take() {
                Some((start, mut record)) => {
                    record.push('\n');
                    record.push_str(line);
                    (start, record)
                }
                None if line.trim().is_empty() => continue,
                None => (i + 1, line.to_string()),
            };
            match split_record(&record) {
                Some(fields) => records.push(fields),
                None => pending = Some((start, record)),
            }
        }
        if let Some((start, _)) = pending {
            return Err(DatasetError::UnterminatedQuote(start));
        }

        let mut records = records.into_iter();
        let header = records.next().ok_or(DatasetError::Empty)?;
        Self::from_rows(header, records.collect())
    }

    /// Read and parse a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_csv_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of a column, in row order.
    pub fn column(&self, name: &str) -> Result<&[String], DatasetError> {
        self.index
            .get(name)
            .map(|&i| self.values[i].as_slice())
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }
}

/// Split one CSV record. Double-quoted fields may contain commas, line breaks
/// and `""` escapes. `None` while a quoted field is still open.
fn split_record(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return None;
    }
    fields.push(field);
    Some(fields)
}
