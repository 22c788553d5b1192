//! Hash command - Print deterministic identifiers.

use anyhow::Result;
use clap::Args;
use customazed_template::HashNamespace;

use super::GlobalArgs;
use crate::app::{write_output, App};

#[derive(Args)]
pub struct HashArgs {
    /// Parts to hash, in order
    #[arg(required_unless_present_any = ["id", "prefix"])]
    parts: Vec<String>,

    /// Print the namespace identifier instead
    #[arg(long, conflicts_with_all = ["parts", "prefix"])]
    id: bool,

    /// Print the upload prefix instead
    #[arg(long, conflicts_with = "parts")]
    prefix: bool,
}

pub async fn execute(args: HashArgs, global: &GlobalArgs) -> Result<()> {
    // An explicit seed needs no configuration file.
    let namespace = match global.hash_ns.as_deref().filter(|s| !s.is_empty()) {
        Some(seed) => HashNamespace::from_seed(seed),
        None => App::load(global)?.loaded.namespace,
    };
    write_output("-", &format!("{}\n", render(&args, &namespace)))
}

fn render(args: &HashArgs, namespace: &HashNamespace) -> String {
    if args.id {
        namespace.id().to_string()
    } else if args.prefix {
        namespace.upload_prefix()
    } else {
        namespace.hash(&args.parts)
    }
}
