//! Template functions and the registry the evaluator calls them through.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{TemplateError, TemplateResult};
use crate::hash::HashNamespace;
use crate::lookup::{ArtifactRegistry, LookupDomain, ValueLookup};

/// Number of string arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// A named capability callable from templates.
pub trait TemplateFunction {
    fn arity(&self) -> Arity {
        Arity::Exactly(1)
    }

    /// Whether results are memoized per session and re-evaluated as templates.
    fn expands(&self) -> bool {
        true
    }

    /// Whether a call changes state outside the session. Such calls are
    /// skipped once the session has already failed.
    fn has_side_effects(&self) -> bool {
        false
    }

    fn call(&mut self, args: &[String]) -> TemplateResult<String>;
}

/// `cfg`, `var` and `env`: one-argument lookups against a [`ValueLookup`].
pub struct LookupFunction<'a> {
    domain: LookupDomain,
    lookup: &'a dyn ValueLookup,
}

impl<'a> LookupFunction<'a> {
    pub fn new(domain: LookupDomain, lookup: &'a dyn ValueLookup) -> Self {
        Self { domain, lookup }
    }
}

impl TemplateFunction for LookupFunction<'_> {
    fn call(&mut self, args: &[String]) -> TemplateResult<String> {
        self.lookup.lookup(self.domain, &args[0])
    }
}

/// `upload`: schedules an artifact and yields its destination URL.
pub struct UploadFunction<'a> {
    artifacts: &'a mut dyn ArtifactRegistry,
}

impl<'a> UploadFunction<'a> {
    pub fn new(artifacts: &'a mut dyn ArtifactRegistry) -> Self {
        Self { artifacts }
    }
}

impl TemplateFunction for UploadFunction<'_> {
    fn has_side_effects(&self) -> bool {
        true
    }

    fn call(&mut self, args: &[String]) -> TemplateResult<String> {
        self.artifacts.register(&args[0])
    }
}

/// `hash`: deterministic identifier over one or more parts.
///
/// Pure and never re-expanded, so values that call `hash` can't form a
/// cycle through it.
pub struct HashFunction {
    namespace: HashNamespace,
}

impl HashFunction {
    pub fn new(namespace: HashNamespace) -> Self {
        Self { namespace }
    }
}

impl TemplateFunction for HashFunction {
    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn expands(&self) -> bool {
        false
    }

    fn call(&mut self, args: &[String]) -> TemplateResult<String> {
        Ok(self.namespace.hash(args))
    }
}

/// Zero-argument identifiers derived from the hash namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceValue {
    /// `id`: the configuration's namespace UUID.
    Id,
    /// `prefix`: the upload destination prefix.
    Prefix,
}

pub struct NamespaceFunction {
    namespace: HashNamespace,
    value: NamespaceValue,
}

impl NamespaceFunction {
    pub fn new(namespace: HashNamespace, value: NamespaceValue) -> Self {
        Self { namespace, value }
    }
}

impl TemplateFunction for NamespaceFunction {
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }

    fn call(&mut self, _args: &[String]) -> TemplateResult<String> {
        Ok(match self.value {
            NamespaceValue::Id => self.namespace.id().to_string(),
            NamespaceValue::Prefix => self.namespace.upload_prefix(),
        })
    }
}

/// Adapter turning a closure into a [`TemplateFunction`].
pub struct FnFunction<F> {
    arity: Arity,
    expands: bool,
    f: F,
}

impl<F> FnFunction<F>
where
    F: FnMut(&[String]) -> TemplateResult<String>,
{
    pub fn new(arity: Arity, f: F) -> Self {
        Self {
            arity,
            expands: true,
            f,
        }
    }

    /// Call the closure directly, without memoization or re-expansion.
    pub fn raw(mut self) -> Self {
        self.expands = false;
        self
    }
}

impl<F> TemplateFunction for FnFunction<F>
where
    F: FnMut(&[String]) -> TemplateResult<String>,
{
    fn arity(&self) -> Arity {
        self.arity
    }

    fn expands(&self) -> bool {
        self.expands
    }

    fn call(&mut self, args: &[String]) -> TemplateResult<String> {
        (self.f)(args)
    }
}

/// Functions available to one template session, keyed by name.
#[derive(Default)]
pub struct FunctionRegistry<'a> {
    functions: BTreeMap<String, Box<dyn TemplateFunction + 'a>>,
}

impl<'a> FunctionRegistry<'a> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// The standard customazed function set: `cfg`, `var`, `env`, `upload`,
    /// `hash`, `id` and `prefix`.
    pub fn standard(
        lookup: &'a dyn ValueLookup,
        artifacts: &'a mut dyn ArtifactRegistry,
        namespace: HashNamespace,
    ) -> Self {
        let mut registry = Self::new();
        registry.register("cfg", LookupFunction::new(LookupDomain::Config, lookup));
        registry.register("var", LookupFunction::new(LookupDomain::Variables, lookup));
        registry.register("env", LookupFunction::new(LookupDomain::Environment, lookup));
        registry.register("upload", UploadFunction::new(artifacts));
        registry.register("hash", HashFunction::new(namespace));
        registry.register("id", NamespaceFunction::new(namespace, NamespaceValue::Id));
        registry.register(
            "prefix",
            NamespaceFunction::new(namespace, NamespaceValue::Prefix),
        );
        registry
    }

    /// Register a function, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, function: impl TemplateFunction + 'a) {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }

    /// Check a call against the registered signature.
    pub fn check(&self, name: &str, argc: usize) -> TemplateResult<()> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| TemplateError::UnknownFunction(name.to_string()))?;
        let arity = function.arity();
        if !arity.accepts(argc) {
            return Err(TemplateError::Arity {
                name: name.to_string(),
                expected: arity.to_string(),
                got: argc,
            });
        }
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<&(dyn TemplateFunction + 'a)> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    pub(crate) fn call(&mut self, name: &str, args: &[String]) -> TemplateResult<String> {
        match self.functions.get_mut(name) {
            Some(function) => function.call(args),
            None => Err(TemplateError::UnknownFunction(name.to_string())),
        }
    }
}

impl fmt::Debug for FunctionRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
