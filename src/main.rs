use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use gator::{builtin_registry, Command, Config, Database, State};

/// Command-line RSS feed aggregator
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ~/.gatorconfig.json)
    #[arg(long, env = "GATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, env = "GATOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Command to run; `help` lists them
    command: String,

    /// Command arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> gator::Result<()> {
    let registry = builtin_registry();

    if cli.command == "help" {
        for (name, description) in registry.descriptions() {
            println!("{name}: {description}");
        }
        return Ok(());
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    // The override only affects this run; it is never saved
    let mut logging = config.logging.clone();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    if let Err(e) = gator::logging::init(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        gator::logging::init_console_only(&logging.level);
    }

    debug!("Using configuration at {}", config_path.display());
    let db = Database::open(&config.db_url).await?;

    let mut state = State::new(db, config, config_path);
    let command = Command::new(cli.command, cli.args);
    info!("Running command {}", command.name);

    registry.run(&mut state, &command).await
}
