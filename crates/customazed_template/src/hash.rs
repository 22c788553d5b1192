//! Name-based identifiers.

use uuid::Uuid;

/// Root namespace every configuration namespace is derived from.
pub const ROOT_NAMESPACE: Uuid = Uuid::from_u128(0x0ca24621_d049_4455_84cf_4c3f7c3875df);

/// A deterministic identifier generator.
///
/// Identifiers are UUIDv5 values, so the same namespace and parts always give
/// the same identifier and re-runs against the same configuration reuse the
/// same resource names and upload paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashNamespace {
    namespace: Uuid,
}

impl HashNamespace {
    /// Namespace for a configuration seed (its `hashNS` setting).
    pub fn from_seed(seed: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&ROOT_NAMESPACE, seed.as_bytes()),
        }
    }

    pub fn from_uuid(namespace: Uuid) -> Self {
        Self { namespace }
    }

    /// The namespace UUID itself.
    pub fn id(&self) -> Uuid {
        self.namespace
    }

    /// Identifier for the given parts, chaining one UUIDv5 step per part so
    /// that `["a", "b:c"]` and `["a:b", "c"]` stay distinct.
    pub fn hash<S: AsRef<str>>(&self, parts: &[S]) -> String {
        parts
            .iter()
            .fold(self.namespace, |ns, part| {
                Uuid::new_v5(&ns, part.as_ref().as_bytes())
            })
            .to_string()
    }

    /// Prefix under which a configuration's uploads are stored.
    pub fn upload_prefix(&self) -> String {
        self.hash(&["upload"])
    }
}
