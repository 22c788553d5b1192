//! customazed CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Template error
//! - 5: Upload error

use std::process::ExitCode;

use clap::Parser;
use customazed_config::ConfigError;
use customazed_storage::StorageError;
use customazed_template::TemplateError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const UPLOAD_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let global = cli.global;
    let result = match cli.command {
        Commands::Template(args) => commands::template::execute(args, &global).await,
        Commands::Resolve(args) => commands::resolve::execute(args, &global).await,
        Commands::Config(args) => commands::config::execute(args, &global).await,
        Commands::Hash(args) => commands::hash::execute(args, &global).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr; stdout carries rendered output.
fn init_logging(cli: &Cli) {
    let default_filter = if cli.global.quiet {
        "warn"
    } else if cli.global.verbose {
        "customazed=debug,warn"
    } else {
        "customazed=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    // A subscriber installed earlier (tests) keeps its place.
    let _ = if cli.global.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.is::<ConfigError>() {
            return ExitCodes::CONFIG_ERROR;
        }
        if cause.is::<TemplateError>() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if cause.is::<StorageError>() {
            return ExitCodes::UPLOAD_ERROR;
        }
        if cause.is::<app::InvalidInput>() {
            return ExitCodes::INVALID_ARGS;
        }
    }
    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_errors() {
        let config = anyhow::Error::new(ConfigError::NotFound("customazed.json".into()));
        assert_eq!(categorize_error(&config), ExitCodes::CONFIG_ERROR);

        let template = anyhow::Error::new(TemplateError::CyclicReference("cfg:a".to_string()));
        assert_eq!(categorize_error(&template), ExitCodes::TEMPLATE_ERROR);

        let upload = anyhow::Error::new(StorageError::UploadsForbidden("no".to_string()))
            .context("uploading artifacts");
        assert_eq!(categorize_error(&upload), ExitCodes::UPLOAD_ERROR);

        let cancelled = anyhow::Error::new(StorageError::Cancelled);
        assert_eq!(categorize_error(&cancelled), ExitCodes::UPLOAD_ERROR);
        assert_eq!(cancelled.to_string(), "Blob: uploads cancelled");

        let source = anyhow::Error::new(StorageError::InvalidSource("../a.sh".to_string()));
        assert_eq!(categorize_error(&source), ExitCodes::UPLOAD_ERROR);

        let input = anyhow::Error::new(app::InvalidInput("not JSON".to_string()));
        assert_eq!(categorize_error(&input), ExitCodes::INVALID_ARGS);

        assert_eq!(
            categorize_error(&anyhow::anyhow!("something else")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
