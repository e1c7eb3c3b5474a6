//! Set command - Set the value of a tag.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::EditOutput;
use crate::passes::SetTag;
use crate::session::Session;

#[derive(Args)]
pub struct SetArgs {
    /// Spec file to edit
    file: PathBuf,

    /// Tag name (case-insensitive)
    tag: String,

    /// New value
    value: String,

    #[command(flatten)]
    output: EditOutput,
}

pub fn execute(args: SetArgs, session: &Session) -> Result<()> {
    let output = args.output.resolve(&args.file)?;
    info!("Setting {} = {} in {}", args.tag, args.value, args.file.display());

    let reader = session.open(&args.file)?;
    session.transform(&reader, &[&SetTag::new(&args.tag, &args.value)])?;
    let text = session.render(reader)?;
    session.emit(&text, &output)
}
