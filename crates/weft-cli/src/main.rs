//! Weft CLI - discover, store and query relationships between files.

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use weft_cli::commands;
use weft_cli::{Cli, Command, Config, Engine, Formatter};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not argument errors
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> weft_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .command
        .output_format()
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let engine = Engine::open(&config, cli.db.as_deref())?;

    match cli.command {
        Command::Detect(args) => commands::execute_detect(args, &engine, &formatter).await?,
        Command::List(args) => commands::execute_list(args, &engine, &formatter)?,
        Command::Find(args) => commands::execute_find(args, &engine, &formatter)?,
        Command::Path(args) => commands::execute_path(args, &engine, &formatter)?,
        Command::Visualize(args) => commands::execute_visualize(args, &engine, &formatter)?,
        Command::Metrics(args) => commands::execute_metrics(args, &engine, &formatter)?,
    }

    Ok(())
}
