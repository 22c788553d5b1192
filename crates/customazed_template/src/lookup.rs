//! Capabilities the engine consumes from its surroundings.

use std::fmt;

use crate::error::TemplateResult;

/// Where a lookup is answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupDomain {
    /// Dotted path into the loaded configuration (`cfg`).
    Config,
    /// User variables declared in the configuration (`var`).
    Variables,
    /// Process environment (`env`).
    Environment,
}

impl LookupDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupDomain::Config => "config",
            LookupDomain::Variables => "variables",
            LookupDomain::Environment => "environment",
        }
    }
}

impl fmt::Display for LookupDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key-value lookup supplied by the configuration/environment loader.
///
/// A missing key is reported as [`TemplateError::Lookup`](crate::TemplateError::Lookup).
#[cfg_attr(test, mockall::automock)]
pub trait ValueLookup {
    fn lookup(&self, domain: LookupDomain, key: &str) -> TemplateResult<String>;
}

/// Artifact registration capability backing the `upload` function.
///
/// Registration must not perform I/O: it records the artifact and returns the
/// URL it will be reachable at once the owner executes its transfers.
pub trait ArtifactRegistry {
    fn register(&mut self, source: &str) -> TemplateResult<String>;
}
