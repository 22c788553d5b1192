//! Environment variable source.

use std::collections::HashMap;

/// Where `env` lookups and environment defaults come from.
#[derive(Debug, Clone, Default)]
pub enum Environment {
    /// The current process environment.
    #[default]
    Process,
    /// A fixed set of variables.
    Fixed(HashMap<String, String>),
}

impl Environment {
    /// Fixed environment built from name/value pairs.
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment::Fixed(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Environment::Process => std::env::var(name).ok(),
            Environment::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}
