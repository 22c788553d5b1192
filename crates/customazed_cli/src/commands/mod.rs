//! CLI command definitions.
//!
//! Every command loads the configuration named by the global options,
//! resolves it, and then works with the resolved values.

use clap::{Args, Parser, Subcommand};
use customazed_config::{
    Overrides, DEFAULT_CONFIG_FILE, ENV_CLIENT_ID, ENV_CONFIG_FILE, ENV_HASH_NS,
    ENV_STORAGE_TOKEN, ENV_SUBSCRIPTION_ID, ENV_TENANT_ID,
};

pub mod config;
pub mod hash;
pub mod resolve;
pub mod template;

/// customazed - Azure VM custom script helper
#[derive(Parser)]
#[command(name = "customazed")]
#[command(version, about = "customazed - Azure VM custom script helper")]
#[command(long_about = r#"
customazed renders scripts and resource documents from a configuration file.
Placeholders such as {{cfg "storage.accountName"}} or {{upload "setup.sh"}}
are replaced with configured values, hashes and blob URLs; files referenced
with upload are transferred to the configured blob container afterwards.

COMMANDS:
  template  → Render a text template
  resolve   → Resolve every string of a JSON document
  config    → Inspect the resolved configuration
  hash      → Print a deterministic identifier

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
  5 - Upload error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (`-` for stdin)
    #[arg(short = 'f', long, global = true, env = ENV_CONFIG_FILE, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Azure tenant ID
    #[arg(long, global = true, env = ENV_TENANT_ID)]
    pub tenant_id: Option<String>,

    /// Azure client ID
    #[arg(long, global = true, env = ENV_CLIENT_ID)]
    pub client_id: Option<String>,

    /// Azure subscription ID
    #[arg(long, global = true, env = ENV_SUBSCRIPTION_ID)]
    pub subscription_id: Option<String>,

    /// Hash namespace seed (random when not configured anywhere)
    #[arg(long, global = true, env = ENV_HASH_NS)]
    pub hash_ns: Option<String>,

    /// Access token for blob transfers
    #[arg(long, global = true, env = ENV_STORAGE_TOKEN, hide_env_values = true)]
    pub storage_token: Option<String>,

    /// Compute upload URLs without transferring anything
    #[arg(long, global = true)]
    pub no_login: bool,

    /// Upload without asking for confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output and prompts
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    /// Identity settings given as flags or environment variables.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            subscription_id: self.subscription_id.clone(),
            hash_ns: self.hash_ns.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a text template
    #[command(alias = "t")]
    Template(template::TemplateArgs),

    /// Resolve every string of a JSON or JSONC document
    Resolve(resolve::ResolveArgs),

    /// Inspect the configuration
    Config(config::ConfigArgs),

    /// Print the identifier for the given parts
    Hash(hash::HashArgs),
}
