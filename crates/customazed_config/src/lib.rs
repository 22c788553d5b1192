//! # customazed_config
//!
//! Configuration for customazed.
//!
//! - [`Config`]: the configuration file model (JSON with comments, or YAML)
//! - [`ConfigLoader`]: reads files or standard input
//! - [`Overrides`]: flag/environment settings layered over the file
//! - [`LoadedConfig`]: a configuration resolved through the template engine
//! - [`ConfigLookup`]: answers `cfg`, `var` and `env` placeholders
//!
//! ## Example
//!
//! ```rust,no_run
//! use customazed_config::{Environment, LoadedConfig, Overrides};
//!
//! # fn example() -> Result<(), customazed_config::ConfigError> {
//! let env = Environment::Process;
//! let overrides = Overrides::from_environment(&env);
//! let loaded = LoadedConfig::load("customazed.json", &overrides, env)?;
//! println!("{}", loaded.config.storage.account_name);
//! # Ok(())
//! # }
//! ```

pub mod dump;
pub mod environment;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod resolve;
pub mod settings;

pub use dump::{dump, prune_empty};
pub use environment::Environment;
pub use error::{ConfigError, ConfigResult};
pub use loader::{strip_jsonc, ConfigFormat, ConfigLoader, STDIN_PATH};
pub use lookup::ConfigLookup;
pub use model::{
    BuilderConfig, Config, GalleryConfig, IdentityConfig, ImageConfig, MachineConfig,
    StorageConfig,
};
pub use resolve::LoadedConfig;
pub use settings::{
    first_non_empty, Overrides, DEFAULT_CLIENT_ID, DEFAULT_CONFIG_FILE, DEFAULT_SUBSCRIPTION_ID,
    DEFAULT_TENANT_ID, ENV_CLIENT_ID, ENV_CONFIG_FILE, ENV_HASH_NS, ENV_STORAGE_TOKEN,
    ENV_SUBSCRIPTION_ID, ENV_TENANT_ID,
};
