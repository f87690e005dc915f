use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::{
    config::Config,
    discover::discover,
    error::TallyError,
    tally::{count_file, FrequencyTable},
    write::write_table,
};

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Files whose output was written.
    pub processed: usize,
    /// `(file name, error)` for files skipped under `keep_going`.
    pub failed: Vec<(String, String)>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Discovery found nothing to convert; no files were touched.
    NoInput,
}

/// Count one candidate and write its `output_` sibling.
pub fn process_file(cfg: &Config, file_name: &str) -> Result<FrequencyTable> {
    let table = count_file(&cfg.input_path(file_name), cfg.input_quote)?;
    write_table(&cfg.output_path(file_name), &table)?;
    Ok(table)
}

/// Discover every candidate in `cfg.dir` and convert each one in turn.
///
/// The first failing file aborts the run unless `cfg.keep_going` is set, in
/// which case the failure is logged and recorded in the summary.
pub fn run(cfg: &Config) -> Result<RunOutcome> {
    let started_at = Utc::now();

    let files = match discover(cfg) {
        Ok(files) => files,
        Err(e) if matches!(e.downcast_ref::<TallyError>(), Some(TallyError::NoInput { .. })) => {
            info!("{}", e);
            return Ok(RunOutcome::NoInput);
        }
        Err(e) => return Err(e),
    };
    info!("{} files to convert", files.len());

    let mut processed = 0;
    let mut failed = Vec::new();
    for name in &files {
        match process_file(cfg, name) {
            Ok(table) => {
                processed += 1;
                info!(
                    file = %name,
                    distinct = table.len(),
                    rows = table.total(),
                    "converted"
                );
            }
            Err(e) if cfg.keep_going => {
                error!(file = %name, "skipping: {:#}", e);
                failed.push((name.clone(), format!("{:#}", e)));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(RunOutcome::Completed(RunSummary {
        processed,
        failed,
        started_at,
        finished_at: Utc::now(),
    }))
}
