//! Load-time resolution of a configuration.

use customazed_storage::{ArtifactUploader, DisabledUploader};
use customazed_template::{HashNamespace, TemplateSession};
use tracing::debug;

use crate::environment::Environment;
use crate::error::{ConfigError, ConfigResult};
use crate::loader::ConfigLoader;
use crate::lookup::ConfigLookup;
use crate::model::Config;
use crate::settings::Overrides;

/// A configuration after overrides and template resolution.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path the configuration was read from.
    pub file: String,
    /// Configuration as written, with overrides applied.
    pub raw: Config,
    /// Configuration with every placeholder resolved.
    pub config: Config,
    pub namespace: HashNamespace,
    environment: Environment,
}

impl LoadedConfig {
    /// Load `path`, apply `overrides` and resolve the result.
    pub fn load(path: &str, overrides: &Overrides, environment: Environment) -> ConfigResult<Self> {
        let (file, mut raw) = ConfigLoader::load(path)?;
        overrides.apply(&mut raw);
        Self::resolve(file, raw, environment)
    }

    /// Resolve the placeholders of `raw`.
    ///
    /// Uploads are refused while the configuration resolves itself, and
    /// `cfg` answers from the unresolved configuration; looked-up values
    /// are expanded in turn, so the outcome is the same.
    pub fn resolve(file: String, raw: Config, environment: Environment) -> ConfigResult<Self> {
        let namespace = HashNamespace::from_seed(&raw.hash_ns);
        debug!("Hash namespace {}", namespace.id());

        let lookup = ConfigLookup::new(&raw, environment.clone())?;
        let mut uploads = DisabledUploader::new(format!("upload: forbidden in {}", file));
        let session = TemplateSession::standard(&lookup, uploads.as_registry(), namespace);
        let config = session
            .resolve(&raw)
            .map_err(|source| ConfigError::Resolve {
                path: file.clone(),
                source,
            })?;

        Ok(Self {
            file,
            raw,
            config,
            namespace,
            environment,
        })
    }

    /// Lookups answering from the resolved configuration.
    pub fn lookup(&self) -> ConfigResult<ConfigLookup> {
        ConfigLookup::new(&self.config, self.environment.clone())
    }
}
