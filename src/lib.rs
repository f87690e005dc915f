//! Per-file frequency tables for the first column of the CSV files in a
//! directory.
//!
//! Every `*.csv` in the configured directory (minus earlier `output*`
//! results) is read once, its trimmed first-column values are tallied, and
//! `output_<name>` is written next to it with `value,count` rows ordered by
//! descending count.

pub mod config;
pub mod discover;
pub mod error;
pub mod run;
pub mod tally;
pub mod write;

pub use config::Config;
pub use discover::discover;
pub use error::TallyError;
pub use run::{process_file, run, RunOutcome, RunSummary};
pub use tally::{count_file, count_reader, FrequencyEntry, FrequencyTable};
pub use write::{write_table, write_table_to};
