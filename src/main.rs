use anyhow::{Context, Result};
use concourse_builder::cli::output::{style, CROSS};
use concourse_builder::cli::{Cli, Command};
use std::io;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout may carry the pipeline, so log to stderr
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let mut stdout = io::stdout().lock();
    let result = match &cli.command {
        Command::Compile(cmd) => cmd.execute(&mut stdout),
        Command::Validate(cmd) => cmd.execute(&mut stdout),
        Command::Columns(cmd) => cmd.execute(&mut stdout),
    };

    if let Err(e) = result {
        eprintln!("{} {}", CROSS, style("Failed:").red());
        for cause in e.chain() {
            eprintln!("  {}", style(cause).red());
        }
        std::process::exit(1);
    }

    Ok(())
}
