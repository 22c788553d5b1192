//! Value lookups backing `cfg`, `var` and `env`.

use std::collections::BTreeMap;

use customazed_template::{LookupDomain, TemplateError, TemplateResult, ValueLookup};
use serde_json::Value;

use crate::environment::Environment;
use crate::error::ConfigResult;
use crate::model::Config;

/// Answers template lookups from a configuration snapshot.
#[derive(Debug, Clone)]
pub struct ConfigLookup {
    document: Value,
    variables: BTreeMap<String, String>,
    environment: Environment,
}

impl ConfigLookup {
    pub fn new(config: &Config, environment: Environment) -> ConfigResult<Self> {
        Ok(Self {
            document: serde_json::to_value(config)?,
            variables: config.variables.clone(),
            environment,
        })
    }

    /// Value at a dotted path such as `storage.accountName`.
    ///
    /// Segments match keys exactly first, then ASCII case-insensitively, so
    /// `Storage.AccountName` finds the same value.
    pub fn get_path(&self, path: &str) -> TemplateResult<String> {
        let mut current = &self.document;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map
                    .get(segment)
                    .or_else(|| {
                        map.iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case(segment))
                            .map(|(_, v)| v)
                    })
                    .ok_or_else(|| {
                        TemplateError::Lookup(format!("Key {:?} not found in config", segment))
                    })?,
                _ => {
                    return Err(TemplateError::Lookup(format!(
                        "Unable to get key {:?} of config {:?}",
                        segment, path
                    )))
                }
            };
        }

        match current {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok(String::new()),
            Value::Object(_) | Value::Array(_) => Err(TemplateError::Lookup(format!(
                "Unable to get value of config {:?}",
                path
            ))),
        }
    }
}

impl ValueLookup for ConfigLookup {
    fn lookup(&self, domain: LookupDomain, key: &str) -> TemplateResult<String> {
        match domain {
            LookupDomain::Config => self.get_path(key),
            LookupDomain::Variables => self.variables.get(key).cloned().ok_or_else(|| {
                TemplateError::Lookup(format!("Key {:?} not found in variables", key))
            }),
            LookupDomain::Environment => self.environment.get(key).ok_or_else(|| {
                TemplateError::Lookup(format!("Environment variable {:?} not found", key))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> ConfigLookup {
        let mut config = Config::default();
        config.storage.account_name = "mystore".to_string();
        config.gallery.exclude_from_latest = true;
        config.gallery.replication_regions = vec!["japaneast".to_string()];
        config.variables.insert("name".to_string(), "demo".to_string());
        ConfigLookup::new(&config, Environment::fixed([("HOME", "/home/me")])).unwrap()
    }

    #[test]
    fn test_dotted_path() {
        let l = lookup();
        assert_eq!(l.lookup(LookupDomain::Config, "storage.accountName").unwrap(), "mystore");
        assert_eq!(l.lookup(LookupDomain::Config, "Storage.AccountName").unwrap(), "mystore");
        assert_eq!(l.lookup(LookupDomain::Config, "gallery.excludeFromLatest").unwrap(), "true");
    }

    #[test]
    fn test_declared_empty_field() {
        assert_eq!(lookup().get_path("machine.machineName").unwrap(), "");
    }

    #[test]
    fn test_missing_and_composite_paths() {
        let l = lookup();
        let err = l.get_path("storage.acountName").unwrap_err();
        assert_eq!(err.to_string(), r#"Key "acountName" not found in config"#);
        assert!(l.get_path("storage").is_err());
        assert!(l.get_path("gallery.replicationRegions").is_err());
        assert!(l.get_path("storage.accountName.x").is_err());
    }

    #[test]
    fn test_variables_and_environment() {
        let l = lookup();
        assert_eq!(l.lookup(LookupDomain::Variables, "name").unwrap(), "demo");
        assert!(l.lookup(LookupDomain::Variables, "other").is_err());
        assert_eq!(l.lookup(LookupDomain::Environment, "HOME").unwrap(), "/home/me");
        let err = l.lookup(LookupDomain::Environment, "NOPE").unwrap_err();
        assert_eq!(err.to_string(), r#"Environment variable "NOPE" not found"#);
    }
}
