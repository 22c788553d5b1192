//! Template command - Render a text template.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::GlobalArgs;
use crate::app::{finish_rendering, read_input, write_output, App};

#[derive(Args)]
pub struct TemplateArgs {
    /// Input file path
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output file path
    #[arg(short, long, default_value = "-")]
    output: String,
}

pub async fn execute(args: TemplateArgs, global: &GlobalArgs) -> Result<()> {
    let app = App::load(global)?;
    let text = read_input(&args.input)?;
    info!("Rendering {}", args.input);

    let lookup = app.loaded.lookup()?;
    let mut uploader = app.uploader()?;
    let rendering = app.session(&lookup, uploader.as_mut()).render(&text);
    let output = finish_rendering(rendering)?;

    write_output(&args.output, &output)?;
    app.run_uploads(uploader.as_mut()).await
}
