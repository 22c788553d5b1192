//! Resolve command - Resolve every string of a JSON document.
//!
//! Only string values are evaluated; keys, numbers, booleans and the shape
//! of the document are left alone.

use anyhow::Result;
use clap::Args;
use customazed_config::strip_jsonc;
use serde_json::Value;
use tracing::{info, warn};

use super::GlobalArgs;
use crate::app::{read_input, write_output, App, InvalidInput};

#[derive(Args)]
pub struct ResolveArgs {
    /// Input JSON or JSONC document
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output file path
    #[arg(short, long, default_value = "-")]
    output: String,
}

pub async fn execute(args: ResolveArgs, global: &GlobalArgs) -> Result<()> {
    let app = App::load(global)?;
    let document = parse_document(&read_input(&args.input)?)?;
    info!("Resolving {}", args.input);

    let lookup = app.loaded.lookup()?;
    let mut uploader = app.uploader()?;
    let rendering = app
        .session(&lookup, uploader.as_mut())
        .render_document(&document);

    if let Some(err) = rendering.error {
        warn!(
            "Resolved with errors:\n{}",
            serde_json::to_string_pretty(&rendering.output)?
        );
        return Err(err.into());
    }

    let mut text = serde_json::to_string_pretty(&rendering.output)?;
    text.push('\n');
    write_output(&args.output, &text)?;
    app.run_uploads(uploader.as_mut()).await
}

/// Parse a JSON document, tolerating comments and trailing commas.
pub fn parse_document(text: &str) -> Result<Value> {
    serde_json::from_str(&strip_jsonc(text))
        .map_err(|e| InvalidInput(format!("not a JSON document: {}", e)).into())
}
