mod cli;
mod commands;
mod config;

use clap::Parser;
use config::{CliOverrides, ResolvedConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("odiff_rs=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Compare {
            base,
            compare,
            diff,
            apng,
            markdown,
            overrides,
        } => {
            let outputs = commands::Outputs {
                diff: diff.as_deref(),
                apng: apng.as_deref(),
                markdown: markdown.as_deref(),
            };
            let outcome = ResolvedConfig::new(overrides)
                .and_then(|config| commands::compare(&config, &base, &compare, outputs));
            std::process::exit(commands::exit_code(outcome));
        }
        cli::Command::Run { binary, args } => {
            let overrides = CliOverrides {
                binary,
                ..Default::default()
            };
            let config = ResolvedConfig::new(overrides)?;
            let code = commands::run(&config, &args)?;
            std::process::exit(code);
        }
    }

    Ok(())
}
