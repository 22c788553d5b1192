//! Configuration file model.
//!
//! Every field defaults to empty so that `cfg` can tell a declared but unset
//! setting (empty string) from a misspelled one (lookup error).

use std::collections::BTreeMap;

use customazed_template::Walk;
use serde::{Deserialize, Serialize};

/// Storage account and blob container receiving uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub location: String,
    pub resource_group: String,
    pub account_name: String,
    pub account_id: String,
    pub container_name: String,
    pub container_id: String,
    pub prefix: String,
    /// Blob service endpoint; the public cloud endpoint of `accountName`
    /// when empty.
    pub blob_endpoint: String,
}

/// User assigned managed identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityConfig {
    pub location: String,
    pub resource_group: String,
    pub identity_name: String,
    pub identity_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineConfig {
    pub resource_group: String,
    pub machine_name: String,
    pub machine_id: String,
}

/// Managed image produced by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageConfig {
    pub location: String,
    pub resource_group: String,
    pub image_name: String,
    pub image_id: String,
    pub skip_setup: bool,
    pub skip_create: bool,
}

/// Shared image gallery and gallery image definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryConfig {
    pub location: String,
    pub resource_group: String,
    pub gallery_name: String,
    pub gallery_id: String,
    pub gallery_image_name: String,
    pub gallery_image_id: String,
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub os_state: String,
    pub os_type: String,
    pub hyper_v_generation: String,
    pub replication_regions: Vec<String>,
    pub exclude_from_latest: bool,
    pub storage_account_type: String,
    pub skip_setup: bool,
    pub skip_create: bool,
}

/// Image builder template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    pub location: String,
    pub resource_group: String,
    pub builder_name: String,
    pub builder_id: String,
}

/// A customazed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub subscription_id: String,
    /// Seed of the hash namespace behind `hash`, `id` and `prefix`.
    #[serde(rename = "hashNS")]
    pub hash_ns: String,
    pub variables: BTreeMap<String, String>,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub machine: MachineConfig,
    pub image: ImageConfig,
    pub gallery: GalleryConfig,
    pub builder: BuilderConfig,
}

impl StorageConfig {
    /// Whether enough is configured to place uploads.
    pub fn is_complete(&self) -> bool {
        ![
            &self.location,
            &self.resource_group,
            &self.account_name,
            &self.container_name,
        ]
        .iter()
        .any(|s| s.is_empty())
    }
}

macro_rules! walk_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl Walk for $ty {
            fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
                $(self.$field.walk_strings(visit);)*
            }
        }
    };
}

walk_fields!(StorageConfig {
    location,
    resource_group,
    account_name,
    account_id,
    container_name,
    container_id,
    prefix,
    blob_endpoint,
});
walk_fields!(IdentityConfig {
    location,
    resource_group,
    identity_name,
    identity_id,
});
walk_fields!(MachineConfig {
    resource_group,
    machine_name,
    machine_id,
});
walk_fields!(ImageConfig {
    location,
    resource_group,
    image_name,
    image_id,
});
walk_fields!(GalleryConfig {
    location,
    resource_group,
    gallery_name,
    gallery_id,
    gallery_image_name,
    gallery_image_id,
    publisher,
    offer,
    sku,
    os_state,
    os_type,
    hyper_v_generation,
    replication_regions,
    storage_account_type,
});
walk_fields!(BuilderConfig {
    location,
    resource_group,
    builder_name,
    builder_id,
});
walk_fields!(Config {
    id,
    tenant_id,
    client_id,
    subscription_id,
    hash_ns,
    variables,
    storage,
    identity,
    machine,
    image,
    gallery,
    builder,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "hashNS": "seed",
            "tenantId": "t",
            "variables": {"name": "demo"},
            "storage": {"accountName": "mystore", "containerName": "c"},
            "gallery": {"hyperVGeneration": "V2", "replicationRegions": ["japaneast"], "excludeFromLatest": true}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.hash_ns, "seed");
        assert_eq!(config.tenant_id, "t");
        assert_eq!(config.variables["name"], "demo");
        assert_eq!(config.storage.account_name, "mystore");
        assert_eq!(config.gallery.hyper_v_generation, "V2");
        assert_eq!(config.gallery.replication_regions, vec!["japaneast"]);
        assert!(config.gallery.exclude_from_latest);
        assert!(config.machine.machine_name.is_empty());
    }

    #[test]
    fn test_walk_visits_nested_strings() {
        let mut config = Config::default();
        config.id = "a".to_string();
        config.variables.insert("k".to_string(), "b".to_string());
        config.gallery.replication_regions = vec!["c".to_string(), "d".to_string()];
        config.builder.builder_name = "e".to_string();

        let mut seen = Vec::new();
        config.walk_strings(&mut |leaf: &mut String| {
            if !leaf.is_empty() {
                seen.push(leaf.clone());
            }
        });
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_storage_completeness() {
        let mut storage = StorageConfig {
            location: "japaneast".to_string(),
            resource_group: "rg".to_string(),
            account_name: "mystore".to_string(),
            ..Default::default()
        };
        assert!(!storage.is_complete());
        storage.container_name = "scripts".to_string();
        assert!(storage.is_complete());
    }
}
