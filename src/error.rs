use std::path::PathBuf;
use thiserror::Error;

/// Faults raised by the tally pipeline that callers may want to match on.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Nothing left to convert once prior outputs are excluded
    #[error("No convertible .csv files found in {}", dir.display())]
    NoInput { dir: PathBuf },

    /// A record without even a first column
    #[error("malformed row in {} at line {line}: no first column", path.display())]
    MalformedRow { path: PathBuf, line: u64 },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
