//! CLI command definitions.
//!
//! Each subcommand reads one spec file, optionally runs transformation
//! passes over its model and renders the result.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::CliError;
use crate::session::Output;

pub mod add_changelog;
pub mod bump_release;
pub mod get;
pub mod render;
pub mod set;
pub mod show;

/// specker - read, edit and re-render RPM spec files
#[derive(Parser)]
#[command(name = "specker")]
#[command(version, about = "specker - read, edit and re-render RPM spec files")]
#[command(long_about = r#"
specker parses RPM spec files into a typed section model, applies edits to
that model and renders it back. Sections that were not edited are written
back byte-for-byte.

COMMANDS:
  render         → Re-render a spec file (original or normalized layout)
  show           → List the sections of a spec file
  get            → Print the value of a tag
  set            → Set the value of a tag
  bump-release   → Increment the Release tag
  add-changelog  → Prepend a %changelog entry

EXIT CODES:
  0 - Success
  1 - General error (e.g. tag not found)
  2 - Invalid arguments, unreadable file or configuration
  3 - Malformed input
  4 - Render failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a specker.toml configuration file
    #[arg(short, long, global = true, env = "SPECKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-render a spec file
    Render(render::RenderArgs),

    /// List the sections of a spec file
    Show(show::ShowArgs),

    /// Print the value of a tag
    Get(get::GetArgs),

    /// Set the value of a tag, adding it when missing
    Set(set::SetArgs),

    /// Increment the Release tag
    #[command(name = "bump-release")]
    BumpRelease(bump_release::BumpReleaseArgs),

    /// Prepend an entry to %changelog
    #[command(name = "add-changelog")]
    AddChangelog(add_changelog::AddChangelogArgs),
}

/// Output options shared by the editing commands.
#[derive(Args, Debug, Clone)]
pub struct EditOutput {
    /// Write the result back to the input file
    #[arg(short, long)]
    pub in_place: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl EditOutput {
    pub fn resolve(&self, input: &std::path::Path) -> Result<Output, CliError> {
        match (self.in_place, &self.output) {
            (true, Some(_)) => Err(CliError::ConflictingOutput),
            (true, None) => Ok(Output::File(input.to_path_buf())),
            (false, Some(path)) => Ok(Output::File(path.clone())),
            (false, None) => Ok(Output::Stdout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["specker", "get", "foo.spec", "Version", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Get(_)));
    }

    #[test]
    fn test_edit_output_resolution() {
        let input = Path::new("foo.spec");
        let stdout = EditOutput {
            in_place: false,
            output: None,
        };
        assert_eq!(stdout.resolve(input).unwrap(), Output::Stdout);

        let in_place = EditOutput {
            in_place: true,
            output: None,
        };
        assert_eq!(in_place.resolve(input).unwrap(), Output::File(input.to_path_buf()));

        let both = EditOutput {
            in_place: true,
            output: Some("out.spec".into()),
        };
        assert!(matches!(both.resolve(input), Err(CliError::ConflictingOutput)));
    }
}
