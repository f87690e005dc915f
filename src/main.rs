use anyhow::Result;
use clap::Parser;
use csvtally::{run, Config, RunOutcome};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Count first-column values of every CSV in a directory"
)]
struct Args {
    /// Directory holding the input files
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Prefix prepended to each output file name
    #[arg(long, default_value = csvtally::config::DEFAULT_OUTPUT_PREFIX)]
    prefix: String,
    /// Log failing files and carry on instead of aborting
    #[arg(long)]
    keep_going: bool,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config {
        keep_going: args.keep_going,
        ..Config::in_dir(args.dir)
    }
    .with_output_prefix(args.prefix);
    info!(dir = %cfg.dir.display(), "startup");

    match run(&cfg)? {
        RunOutcome::NoInput => {
            println!("No convertible .csv files found.");
        }
        RunOutcome::Completed(summary) => {
            for (name, err) in &summary.failed {
                warn!(file = %name, "not converted: {}", err);
            }
            println!(
                "Processed {} files in {} seconds.",
                summary.processed,
                summary.elapsed_secs()
            );
        }
    }
    Ok(())
}
