//! diskchurn CLI entry point

use chrono::Utc;
use diskchurn::config::{cli::Cli, toml, validator};
use diskchurn::coordinator::Coordinator;
use diskchurn::observability::initialize_tracing;
use diskchurn::output::{json, text};
use diskchurn::{EXIT_FATAL, EXIT_USAGE};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    initialize_tracing(cli.debug);

    let raw = match toml::load(&cli) {
        Ok(raw) => raw,
        Err(e) => {
            println!("{:#}", e);
            return exit_code(EXIT_USAGE);
        }
    };

    // Nothing has touched the filesystem yet, whichever way this fails
    let config = match validator::validate(&raw) {
        Ok(config) => config,
        Err(e) if e.is_fatal() => {
            error!("{}", e);
            return exit_code(e.exit_code());
        }
        Err(e) => {
            println!("{}", e);
            return exit_code(e.exit_code());
        }
    };

    println!("diskchurn v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", config);
    println!();

    if cli.dry_run {
        println!("Dry run mode - configuration validated successfully");
        return ExitCode::SUCCESS;
    }

    if cli.show_free_space {
        text::print_free_space("before", &config.directories);
        println!();
    }

    let started_at = Utc::now();
    let coordinator = Coordinator::new(config.clone());
    let summary = match coordinator.run() {
        Ok(summary) => summary,
        Err(e) => {
            error!("{:#}", e);
            return exit_code(EXIT_FATAL);
        }
    };

    text::print_summary(&summary);

    if cli.show_free_space {
        text::print_free_space("after", &config.directories);
    }

    if cli.json {
        if let Err(e) = json::print_summary(&summary, &config, started_at) {
            error!("{:#}", e);
            return exit_code(EXIT_FATAL);
        }
    }

    ExitCode::SUCCESS
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}
