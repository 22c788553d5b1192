//! Template sessions: one resolution pass over one document or string.

use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::function::FunctionRegistry;
use crate::hash::HashNamespace;
use crate::lookup::{ArtifactRegistry, ValueLookup};
use crate::memo::{CallKey, MemoTable};
use crate::parser::{self, Call, Node};
use crate::walk::Walk;

/// Output of a resolution pass together with its terminal error.
///
/// When `error` is set the output still carries `<ERROR:...>` markers where
/// substitutions failed. It is for diagnostics only and never a valid result.
#[derive(Debug, Clone)]
pub struct Rendering<T> {
    pub output: T,
    pub error: Option<TemplateError>,
}

impl<T> Rendering<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> TemplateResult<T> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.output),
        }
    }
}

/// Deepest chain of nested expansions a session follows before failing.
pub const MAX_EXPANSION_DEPTH: usize = 128;

/// A single resolution pass.
///
/// Holds the memo table, the in-flight set and every error recorded so far;
/// the first of them is the terminal error. The top-level operations consume
/// the session so nothing leaks between passes.
#[derive(Debug)]
pub struct TemplateSession<'a> {
    functions: FunctionRegistry<'a>,
    memo: MemoTable,
    errors: Vec<TemplateError>,
    depth: usize,
}

impl<'a> TemplateSession<'a> {
    pub fn new(functions: FunctionRegistry<'a>) -> Self {
        Self {
            functions,
            memo: MemoTable::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Session over the standard function set.
    pub fn standard(
        lookup: &'a dyn ValueLookup,
        artifacts: &'a mut dyn ArtifactRegistry,
        namespace: HashNamespace,
    ) -> Self {
        Self::new(FunctionRegistry::standard(lookup, artifacts, namespace))
    }

    /// Evaluate free-form text.
    pub fn execute(self, text: &str) -> TemplateResult<String> {
        self.render(text).into_result()
    }

    /// Evaluate free-form text, keeping the marker-bearing output on failure.
    pub fn render(mut self, text: &str) -> Rendering<String> {
        let output = match self.evaluate(text) {
            Ok(output) => output,
            Err(err) => {
                self.record(err);
                text.to_string()
            }
        };
        Rendering {
            output,
            error: self.errors.into_iter().next(),
        }
    }

    /// Resolve every string leaf of a copy of `document`.
    pub fn resolve<T: Walk + Clone>(self, document: &T) -> TemplateResult<T> {
        self.render_document(document).into_result()
    }

    /// Resolve every string leaf, visiting all of them even after a failure
    /// so the diagnostic copy marks every substitution that went wrong.
    pub fn render_document<T: Walk + Clone>(mut self, document: &T) -> Rendering<T> {
        let mut resolved = document.clone();
        resolved.walk_strings(&mut |leaf: &mut String| {
            if !leaf.contains("{{") {
                return;
            }
            *leaf = match self.evaluate(leaf) {
                Ok(value) => value,
                Err(err) => self.fail(err),
            };
        });
        Rendering {
            output: resolved,
            error: self.errors.into_iter().next(),
        }
    }

    fn evaluate(&mut self, text: &str) -> TemplateResult<String> {
        let nodes = parser::parse(text)?;
        for node in &nodes {
            if let Node::Call(call) = node {
                self.functions.check(&call.name, call.args.len())?;
            }
        }

        let mut out = String::with_capacity(text.len());
        for node in &nodes {
            match node {
                Node::Text(text) | Node::Literal(text) => out.push_str(text),
                Node::Call(call) => {
                    let value = self.invoke(call);
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }

    fn invoke(&mut self, call: &Call) -> String {
        let Some((expands, side_effects)) = self
            .functions
            .get(&call.name)
            .map(|f| (f.expands(), f.has_side_effects()))
        else {
            return self.fail(TemplateError::UnknownFunction(call.name.clone()));
        };

        if !expands {
            return match self.functions.call(&call.name, &call.args) {
                Ok(value) => value,
                Err(err) => self.fail(err),
            };
        }

        let key = CallKey::new(&call.name, &call.argument_key());
        if let Some(memo) = self.memo.lookup(&key) {
            debug!("template: {} (cached)", key);
            let (value, error) = (memo.value.clone(), memo.error.clone());
            if let Some(err) = error {
                self.record(err);
            }
            return value;
        }

        if side_effects && !self.errors.is_empty() {
            return self.fail(TemplateError::Upload(format!(
                "{} skipped after earlier error",
                key
            )));
        }

        if self.depth >= MAX_EXPANSION_DEPTH {
            return self.fail(TemplateError::ExpansionDepth {
                key: key.to_string(),
                limit: MAX_EXPANSION_DEPTH,
            });
        }

        let token = match self.memo.try_begin(key) {
            Ok(token) => token,
            Err(err) => return self.fail(err),
        };

        debug!("template: {}", token.key());
        let raw = match self.functions.call(&call.name, &call.args) {
            Ok(raw) => raw,
            Err(err) => {
                let marker = self.fail(err.clone());
                return self.memo.complete_failed(token, marker, err);
            }
        };

        let mark = self.errors.len();
        self.depth += 1;
        let expanded = self.evaluate(&raw);
        self.depth -= 1;

        match expanded {
            Ok(expanded) => match self.errors.get(mark).cloned() {
                None => self.memo.complete(token, expanded),
                // Nested failures are already recorded and marked inside.
                Some(err) => self.memo.complete_failed(token, expanded, err),
            },
            Err(err) => {
                let marker = self.fail(err.clone());
                self.memo.complete_failed(token, marker, err)
            }
        }
    }

    fn record(&mut self, err: TemplateError) {
        self.errors.push(err);
    }

    fn fail(&mut self, err: TemplateError) -> String {
        debug!("template: {}", err);
        let marker = err.marker();
        self.record(err);
        marker
    }
}
