//! Integration tests for loading and resolving configuration files.

use std::fs;

use customazed_config::{
    dump, ConfigError, ConfigLoader, Environment, LoadedConfig, Overrides, DEFAULT_CLIENT_ID,
    ENV_HASH_NS, ENV_TENANT_ID,
};
use customazed_template::{HashNamespace, LookupDomain, ValueLookup};
use tempfile::tempdir;

const JSONC: &str = r#"{
  // identity of this deployment
  "hashNS": "integration",
  "variables": {
    "name": "demo",
  },
  "storage": {
    "location": "japaneast",
    "resourceGroup": "{{var \"name\"}}-rg",
    "accountName": "st{{var \"name\"}}",
    "containerName": "scripts", /* fixed */
  },
  "machine": {
    "machineName": "vm-{{cfg \"storage.resourceGroup\"}}",
  },
}
"#;

fn no_env() -> Environment {
    Environment::fixed::<_, String, String>([])
}

#[test]
fn test_load_jsonc_and_resolve() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("customazed.json");
    fs::write(&path, JSONC).unwrap();

    let loaded = LoadedConfig::load(path.to_str().unwrap(), &Overrides::default(), no_env()).unwrap();

    assert_eq!(loaded.config.storage.resource_group, "demo-rg");
    assert_eq!(loaded.config.storage.account_name, "stdemo");
    assert_eq!(loaded.config.machine.machine_name, "vm-demo-rg");
    assert_eq!(loaded.config.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(loaded.namespace, HashNamespace::from_seed("integration"));
    assert!(loaded.config.storage.is_complete());
}

#[test]
fn test_missing_json_falls_back_to_jsonc() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("customazed.jsonc"), JSONC).unwrap();

    let requested = dir.path().join("customazed.json");
    let (file, config) = ConfigLoader::load(requested.to_str().unwrap()).unwrap();
    assert!(file.ends_with("customazed.jsonc"));
    assert_eq!(config.hash_ns, "integration");
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let requested = dir.path().join("nothing.json");
    let err = ConfigLoader::load(requested.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_load_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("customazed.yaml");
    fs::write(
        &path,
        "hashNS: yaml\nvariables:\n  name: demo\nimage:\n  imageName: img-{{var \"name\"}}\n  skipSetup: true\n",
    )
    .unwrap();

    let loaded = LoadedConfig::load(path.to_str().unwrap(), &Overrides::default(), no_env()).unwrap();
    assert_eq!(loaded.config.image.image_name, "img-demo");
    assert!(loaded.config.image.skip_setup);
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("customazed.json");
    fs::write(&path, r#"{"hashNS": "file", "tenantId": "file-tenant", "id": "{{cfg \"tenantId\"}}"}"#)
        .unwrap();

    let env = Environment::fixed([(ENV_HASH_NS, "env"), (ENV_TENANT_ID, "env-tenant")]);
    let overrides = Overrides::from_environment(&env);
    let loaded = LoadedConfig::load(path.to_str().unwrap(), &overrides, env).unwrap();

    assert_eq!(loaded.config.tenant_id, "env-tenant");
    assert_eq!(loaded.config.id, "env-tenant");
    assert_eq!(loaded.namespace, HashNamespace::from_seed("env"));
}

#[test]
fn test_resolution_error_names_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("customazed.json");
    fs::write(&path, r#"{"hashNS": "x", "id": "{{upload \"a.sh\"}}"}"#).unwrap();

    let err = LoadedConfig::load(path.to_str().unwrap(), &Overrides::default(), no_env()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("upload: forbidden in"));
    assert!(message.contains("customazed.json"));
}

#[test]
fn test_lookup_over_resolved_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("customazed.json");
    fs::write(&path, JSONC).unwrap();

    let loaded = LoadedConfig::load(path.to_str().unwrap(), &Overrides::default(), no_env()).unwrap();
    let lookup = loaded.lookup().unwrap();
    assert_eq!(
        lookup.lookup(LookupDomain::Config, "Machine.MachineName").unwrap(),
        "vm-demo-rg"
    );
}

#[test]
fn test_dump_resolved_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("customazed.json");
    fs::write(&path, JSONC).unwrap();

    let loaded = LoadedConfig::load(path.to_str().unwrap(), &Overrides::default(), no_env()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&dump(&loaded.config).unwrap()).unwrap();
    assert_eq!(value["storage"]["accountName"], "stdemo");
    assert!(value.get("identity").is_none());
    assert!(value["storage"].get("prefix").is_none());
}
