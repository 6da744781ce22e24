use crate::{env::EnvManager, error::CliError};
use clap::Parser;
use engine_config::{
    defaults::DEFAULT_CHECKPOINT_PATH,
    loader::{ConfigLoader, ConfigType},
    options::RunOptions,
};
use engine_runtime::execution;
use std::{path::PathBuf, str::FromStr};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod env;
mod error;
mod output;

#[derive(Parser, Debug)]
#[command(
    name = "uploader",
    version = "0.1.0",
    about = "Upload tabular input to MySQL and Redis targets"
)]
struct Cli {
    /// Configuration file describing the input and its targets
    config: PathBuf,

    /// Input file to upload
    input: PathBuf,

    /// Continue from the last saved checkpoint
    #[arg(long)]
    resume: bool,

    /// Log the configuration, checkpoint and each batch at debug level
    #[arg(long)]
    verbose: bool,

    /// Resolve and log rows without connecting to any target
    #[arg(long)]
    dry_run: bool,

    /// Write each batch to all targets at once
    #[arg(long)]
    concurrent_targets: bool,

    #[arg(long, default_value = "yaml", help = "Configuration file format")]
    config_type: String,

    #[arg(long, default_value = DEFAULT_CHECKPOINT_PATH, help = "Where the checkpoint is saved on failure")]
    check_point_path: PathBuf,

    #[arg(long, help = "KEY=VALUE file merged over the process environment")]
    env_file: Option<PathBuf>,

    #[arg(long, help = "Print the run summary as JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_type = ConfigType::from_str(&cli.config_type)?;
    let mut env = EnvManager::from_process();
    if let Some(path) = &cli.env_file {
        env.load_file(path)?;
    }
    let loader = ConfigLoader::new(config_type, env.into_vars());

    let mut options = RunOptions::new(&cli.config, &cli.input)
        .with_checkpoint_path(&cli.check_point_path)
        .with_resume(cli.resume);
    options.verbose = cli.verbose;
    options.dry_run = cli.dry_run;
    options.concurrent_targets = cli.concurrent_targets;

    info!(
        config = %cli.config.display(),
        input = %cli.input.display(),
        resume = cli.resume,
        dry_run = cli.dry_run,
        "Starting upload"
    );

    let summary = execution::run(options, &loader, None).await?;
    output::print_summary(&summary, cli.json)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
