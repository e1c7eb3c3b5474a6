//! Render command - Re-render a spec file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use specker_model::Layout;

use crate::session::{Output, Session};

#[derive(Args)]
pub struct RenderArgs {
    /// Spec file to render
    file: PathBuf,

    /// Layout to render with (defaults to the configured layout)
    #[arg(short, long)]
    layout: Option<Layout>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, session: &Session) -> Result<()> {
    info!("Rendering {}", args.file.display());

    let mut config = session.config().renderer.clone();
    if let Some(layout) = args.layout {
        config = config.layout(layout);
    }

    let reader = session.open(&args.file)?;
    let text = session.render_with(reader, &config)?;

    let output = match args.output {
        Some(path) => Output::File(path),
        None => Output::Stdout,
    };
    session.emit(&text, &output)
}
