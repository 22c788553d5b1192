//! # customazed_template
//!
//! Template variable resolution engine for customazed.
//!
//! Configuration values and input documents may reference live values
//! through `{{function "argument"}}` placeholders:
//!
//! - `cfg` / `var` / `env`: configuration paths, user variables, environment
//! - `upload`: schedule a local file for upload and yield its blob URL
//! - `hash`: deterministic identifier over one or more parts
//! - `id` / `prefix`: the configuration namespace and upload prefix
//!
//! Results of every function but `hash` are themselves evaluated as
//! templates, memoized for the rest of the session, and guarded against
//! cyclic references. Failed substitutions become `<ERROR:...>` markers while
//! the first error is kept as the session's terminal error.
//!
//! ## Example
//!
//! ```rust
//! use customazed_template::{
//!     ArtifactRegistry, HashNamespace, LookupDomain, TemplateError, TemplateResult,
//!     TemplateSession, ValueLookup,
//! };
//!
//! struct Settings;
//!
//! impl ValueLookup for Settings {
//!     fn lookup(&self, domain: LookupDomain, key: &str) -> TemplateResult<String> {
//!         match (domain, key) {
//!             (LookupDomain::Config, "storage.accountName") => Ok("mystore".to_string()),
//!             _ => Err(TemplateError::Lookup(format!("Key {:?} not found", key))),
//!         }
//!     }
//! }
//!
//! struct NoUploads;
//!
//! impl ArtifactRegistry for NoUploads {
//!     fn register(&mut self, _source: &str) -> TemplateResult<String> {
//!         Err(TemplateError::UploadDisabled("upload: forbidden".to_string()))
//!     }
//! }
//!
//! let mut uploads = NoUploads;
//! let session = TemplateSession::standard(&Settings, &mut uploads, HashNamespace::from_seed("demo"));
//! let out = session.execute(r#"{{cfg "storage.accountName"}}-data"#).unwrap();
//! assert_eq!(out, "mystore-data");
//! ```

pub mod error;
pub mod function;
pub mod hash;
pub mod lookup;
pub mod memo;
pub mod parser;
pub mod session;
pub mod walk;

pub use error::{TemplateError, TemplateResult};
pub use function::{
    Arity, FnFunction, FunctionRegistry, HashFunction, LookupFunction, NamespaceFunction,
    NamespaceValue, TemplateFunction, UploadFunction,
};
pub use hash::{HashNamespace, ROOT_NAMESPACE};
pub use lookup::{ArtifactRegistry, LookupDomain, ValueLookup};
pub use memo::{CallKey, InFlight, Memo, MemoTable};
pub use parser::{parse, Call, Node};
pub use session::{Rendering, TemplateSession, MAX_EXPANSION_DEPTH};
pub use walk::Walk;
