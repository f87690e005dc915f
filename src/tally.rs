use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::{collections::HashMap, fs::File, io::Read, path::Path};
use tracing::{debug, info};

use crate::error::TallyError;

/// One row of a frequency table: a first-column key and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: u64,
}

/// Keys ordered by descending count; equal counts keep first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the number of rows that were tallied.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// `(value, count)` pairs, mostly handy in tests and logging.
    pub fn pairs(&self) -> Vec<(&str, u64)> {
        self.entries
            .iter()
            .map(|e| (e.value.as_str(), e.count))
            .collect()
    }
}

/// Running tally that remembers the order keys were first seen in.
#[derive(Debug, Default)]
struct Counter {
    index: HashMap<String, usize>,
    entries: Vec<FrequencyEntry>,
}

impl Counter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(FrequencyEntry {
                    value: key.to_string(),
                    count: 1,
                });
            }
        }
    }

    /// `sort_by` is stable, so ties stay in first-seen order.
    fn most_common(mut self) -> FrequencyTable {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        FrequencyTable {
            entries: self.entries,
        }
    }
}

/// 1-based number of the first line outside a quoted field that holds no
/// bytes at all. Such a line is a row without even a first column, which the
/// CSV reader would otherwise skip silently. A final terminator is not a row.
fn first_blank_line(data: &[u8], delimiter: u8, quote: u8) -> Option<u64> {
    let mut line = 1u64;
    let mut line_len = 0usize;
    let mut field_start = true;
    let mut in_quotes = false;

    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        let next = data.get(i + 1).copied();
        i += 1;

        if in_quotes {
            if b == quote {
                if next == Some(quote) {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            } else if b == b'\n' {
                line += 1;
            }
            continue;
        }

        match b {
            // the `\n` of a `\r\n` pair ends the line
            b'\r' if next == Some(b'\n') => {}
            b'\n' | b'\r' => {
                if line_len == 0 {
                    return Some(line);
                }
                line += 1;
                line_len = 0;
                field_start = true;
            }
            _ => {
                line_len += 1;
                if b == delimiter {
                    field_start = true;
                } else {
                    in_quotes = field_start && b == quote;
                    field_start = false;
                }
            }
        }
    }
    None
}

/// Tally the first column of every record read from `rdr`.
///
/// A raw first column that is empty is skipped; anything else is trimmed and
/// counted, so a whitespace-only cell counts under the empty key. A blank
/// line has no first column at all and fails with
/// [`TallyError::MalformedRow`]. `source` is only used in error messages.
pub fn count_reader<R: Read>(mut rdr: R, quote: u8, source: &Path) -> Result<FrequencyTable> {
    const DELIMITER: u8 = b',';

    let mut data = Vec::new();
    rdr.read_to_end(&mut data)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    if let Some(line) = first_blank_line(&data, DELIMITER, quote) {
        return Err(TallyError::MalformedRow {
            path: source.to_path_buf(),
            line,
        }
        .into());
    }

    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    let mut counter = Counter::default();
    let mut rows = 0u64;
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", source.display(), idx))?;

        let raw = record.get(0).ok_or_else(|| TallyError::MalformedRow {
            path: source.to_path_buf(),
            line: record
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 1),
        })?;
        if raw.is_empty() {
            continue;
        }

        counter.add(raw.trim());
        rows += 1;
    }

    info!("ordering by most common");
    let table = counter.most_common();
    debug!(rows, distinct = table.len(), "tallied {}", source.display());
    Ok(table)
}

/// Open `path` and build its frequency table.
#[tracing::instrument(level = "info", skip(path, quote), fields(path = %path.display()))]
pub fn count_file(path: &Path, quote: u8) -> Result<FrequencyTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    info!("reading file");
    count_reader(file, quote, path)
}
