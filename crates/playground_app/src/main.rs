use std::path::PathBuf;

use clap::Parser;
use playground_app::{logging, App, AppConfig, ErrorPolicy, Scenario, UploadPolicy, EXIT_INIT_FAILURE};

/// Spinning-shape playground
#[derive(Parser)]
#[command(name = "playground")]
#[command(about = "Renders one of the built-in scenarios until Escape or window close")]
struct Cli {
    /// Scenario to run (see --list)
    #[arg(short, long)]
    scenario: Option<String>,

    /// TOML config file with [window] and [run] tables
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop on the first driver error (exit code 1)
    #[arg(long)]
    strict: bool,

    /// Re-upload every mesh each frame instead of once
    #[arg(long)]
    per_frame_upload: bool,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print the built-in scenarios and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.list {
        for name in Scenario::BUILTIN {
            println!("{name}");
        }
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("playground: {e}");
            std::process::exit(EXIT_INIT_FAILURE);
        }
    };

    std::process::exit(App::from_config(config).run());
}

/// File (if any), then command-line overrides, then logger installation.
fn load_config(cli: &Cli) -> Result<AppConfig, playground_app::InitError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(name) = &cli.scenario {
        config.run.scenario = name.clone();
    }
    if cli.strict {
        config.run.errors = ErrorPolicy::Strict;
    }
    if cli.per_frame_upload {
        config.run.upload = UploadPolicy::PerFrame;
    }
    if let Some(level) = &cli.log_level {
        config.run.log_level = level.clone();
    }

    logging::init(logging::parse_level(&config.run.log_level)?)?;
    Ok(config)
}
