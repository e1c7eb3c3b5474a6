//! Add-changelog command - Prepend a %changelog entry.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::info;

use super::EditOutput;
use crate::error::CliError;
use crate::passes::AddChangelogEntry;
use crate::session::Session;

#[derive(Args)]
pub struct AddChangelogArgs {
    /// Spec file to edit
    file: PathBuf,

    /// Entry author, e.g. "Jane Packager <jane@example.org>"
    #[arg(short, long)]
    author: String,

    /// Entry text; each line becomes a `- ` item
    #[arg(short, long)]
    message: String,

    /// Entry date as YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    date: Option<String>,

    #[command(flatten)]
    output: EditOutput,
}

/// Parse `--date`, falling back to the local date.
pub fn changelog_date(date: Option<&str>) -> Result<NaiveDate, CliError> {
    match date {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| CliError::InvalidDate(value.to_string())),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn execute(args: AddChangelogArgs, session: &Session) -> Result<()> {
    let output = args.output.resolve(&args.file)?;
    let date = changelog_date(args.date.as_deref())?;
    info!("Adding changelog entry by {} to {}", args.author, args.file.display());

    let reader = session.open(&args.file)?;
    let entry = AddChangelogEntry::new(date, args.author, args.message);
    session.transform(&reader, &[&entry])?;

    let text = session.render(reader)?;
    session.emit(&text, &output)
}
