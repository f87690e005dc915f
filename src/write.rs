use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use std::{fs::File, io::Write, path::Path};
use tracing::info;

use crate::tally::FrequencyTable;

/// Serialize `table` as `value,count` rows into any writer. Values holding
/// a comma, quote or newline get standard `"` quoting; rows end in `\r\n`.
pub fn write_table_to<W: Write>(wtr: W, table: &FrequencyTable) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(wtr);
    for entry in &table.entries {
        wtr.serialize(entry)
            .with_context(|| format!("serializing row for '{}'", entry.value))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

/// Create (or truncate) `path` and write `table` into it.
#[tracing::instrument(level = "info", skip(path, table), fields(path = %path.display()))]
pub fn write_table(path: &Path, table: &FrequencyTable) -> Result<()> {
    info!("writing results");
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_table_to(file, table)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    info!(rows = table.len(), "done creating {}", path.display());
    Ok(())
}
