//! Per-session memo table and cycle detection.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{TemplateError, TemplateResult};

/// Cache key of one function invocation: `name:argument`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey(String);

impl CallKey {
    pub fn new(name: &str, argument: &str) -> Self {
        Self(format!("{}:{}", name, argument))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof that an evaluation is in flight. Must be handed back through
/// [`MemoTable::complete`] or [`MemoTable::abandon`].
#[must_use]
#[derive(Debug)]
pub struct InFlight {
    key: CallKey,
}

impl InFlight {
    pub fn key(&self) -> &CallKey {
        &self.key
    }
}

/// Outcome of a completed evaluation.
///
/// A failed expansion keeps its marker-bearing text together with the first
/// error raised inside it, so reusing it reports the same failure again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memo {
    pub value: String,
    pub error: Option<TemplateError>,
}

/// Completed results plus the set of invocations currently being
/// evaluated.
#[derive(Debug, Default)]
pub struct MemoTable {
    cache: HashMap<CallKey, Memo>,
    inflight: HashSet<CallKey>,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously completed result for `key`.
    pub fn lookup(&self, key: &CallKey) -> Option<&Memo> {
        self.cache.get(key)
    }

    /// Whether `key` is being evaluated further up the current call chain.
    pub fn is_cyclic(&self, key: &CallKey) -> bool {
        self.inflight.contains(key)
    }

    /// Mark `key` in flight, failing if it already is.
    pub fn try_begin(&mut self, key: CallKey) -> TemplateResult<InFlight> {
        if self.is_cyclic(&key) {
            return Err(TemplateError::CyclicReference(key.0));
        }
        self.inflight.insert(key.clone());
        Ok(InFlight { key })
    }

    /// Clear the in-flight mark and cache the expanded value.
    pub fn complete(&mut self, token: InFlight, value: String) -> String {
        self.finish(token, value, None)
    }

    /// Clear the in-flight mark and cache a failed expansion.
    pub fn complete_failed(&mut self, token: InFlight, value: String, error: TemplateError) -> String {
        self.finish(token, value, Some(error))
    }

    fn finish(&mut self, token: InFlight, value: String, error: Option<TemplateError>) -> String {
        self.inflight.remove(&token.key);
        self.cache.insert(
            token.key,
            Memo {
                value: value.clone(),
                error,
            },
        );
        value
    }
}
