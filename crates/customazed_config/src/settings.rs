//! Identity settings and their defaults.
//!
//! Precedence, highest first: command-line flag, environment variable,
//! configuration file, built-in default.

use tracing::debug;
use uuid::Uuid;

use crate::environment::Environment;
use crate::model::Config;

pub const ENV_CONFIG_FILE: &str = "CUSTOMAZED_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "customazed.json";
pub const ENV_HASH_NS: &str = "CUSTOMAZED_HASHNS";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const DEFAULT_TENANT_ID: &str = "common";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const DEFAULT_CLIENT_ID: &str = "a3c13aac-2eb7-4d8a-b7ae-c29b516d566b";
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const DEFAULT_SUBSCRIPTION_ID: &str = "";
pub const ENV_STORAGE_TOKEN: &str = "CUSTOMAZED_STORAGE_TOKEN";

/// First item that is present and not empty.
pub fn first_non_empty<'a, I>(items: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    items.into_iter().flatten().find(|s| !s.is_empty())
}

/// Settings given on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub subscription_id: Option<String>,
    pub hash_ns: Option<String>,
}

impl Overrides {
    /// Overrides taken from environment variables alone.
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            tenant_id: env.get(ENV_TENANT_ID),
            client_id: env.get(ENV_CLIENT_ID),
            subscription_id: env.get(ENV_SUBSCRIPTION_ID),
            hash_ns: env.get(ENV_HASH_NS),
        }
    }

    /// Fill settings missing here from `fallback`.
    pub fn or(self, fallback: Overrides) -> Self {
        fn pick(a: Option<String>, b: Option<String>) -> Option<String> {
            a.filter(|s| !s.is_empty()).or(b)
        }
        Self {
            tenant_id: pick(self.tenant_id, fallback.tenant_id),
            client_id: pick(self.client_id, fallback.client_id),
            subscription_id: pick(self.subscription_id, fallback.subscription_id),
            hash_ns: pick(self.hash_ns, fallback.hash_ns),
        }
    }

    /// Apply these settings over `config`, falling back to the built-in
    /// defaults. Without any hash namespace seed a random one is used, so
    /// hashes are only stable across runs when a seed is configured.
    pub fn apply(&self, config: &mut Config) {
        config.tenant_id = resolve(&self.tenant_id, &config.tenant_id, DEFAULT_TENANT_ID);
        config.client_id = resolve(&self.client_id, &config.client_id, DEFAULT_CLIENT_ID);
        config.subscription_id = resolve(
            &self.subscription_id,
            &config.subscription_id,
            DEFAULT_SUBSCRIPTION_ID,
        );

        let random = Uuid::new_v4().to_string();
        config.hash_ns = resolve(&self.hash_ns, &config.hash_ns, &random);
        debug!("Hash namespace seed {}", config.hash_ns);
    }
}

fn resolve(flag: &Option<String>, configured: &str, default: &str) -> String {
    first_non_empty([flag.as_deref(), Some(configured), Some(default)])
        .unwrap_or_default()
        .to_string()
}
