//! Config command - Inspect the resolved configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use super::GlobalArgs;
use crate::app::{write_output, App};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration, omitting empty settings
    Dump {
        /// Print the configuration as written, before resolution
        #[arg(long)]
        raw: bool,
    },
}

pub async fn execute(args: ConfigArgs, global: &GlobalArgs) -> Result<()> {
    let app = App::load(global)?;
    match args.action {
        ConfigAction::Dump { raw } => {
            info!("Dumping configuration");
            let config = if raw {
                &app.loaded.raw
            } else {
                &app.loaded.config
            };
            let mut text = customazed_config::dump(config)?;
            text.push('\n');
            write_output("-", &text)
        }
    }
}
