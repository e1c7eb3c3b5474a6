//! Bump-release command - Increment the Release tag.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use specker_model::{SpecModelManipulator, TransformationPass};

use super::add_changelog::changelog_date;
use super::EditOutput;
use crate::error::CliError;
use crate::passes::{bump_release, AddChangelogEntry, SetTag};
use crate::session::Session;

#[derive(Args)]
pub struct BumpReleaseArgs {
    /// Spec file to edit
    file: PathBuf,

    /// Also prepend a %changelog entry with this message
    #[arg(short, long, requires = "author")]
    message: Option<String>,

    /// Changelog entry author, e.g. "Jane Packager <jane@example.org>"
    #[arg(short, long, requires = "message")]
    author: Option<String>,

    /// Changelog entry date as YYYY-MM-DD (defaults to today)
    #[arg(short, long, requires = "message")]
    date: Option<String>,

    #[command(flatten)]
    output: EditOutput,
}

pub fn execute(args: BumpReleaseArgs, session: &Session) -> Result<()> {
    let output = args.output.resolve(&args.file)?;
    let reader = session.open(&args.file)?;

    let release = reader
        .borrow()
        .model()
        .and_then(|model| model.tag_value("Release").map(str::to_string))
        .ok_or_else(|| CliError::TagNotFound("Release".to_string()))?;
    let bumped =
        bump_release(&release).ok_or_else(|| CliError::UnbumpableRelease(release.clone()))?;
    info!("Bumping release {} -> {}", release, bumped);

    let set_release = SetTag::new("Release", bumped);
    let changelog = match (args.message, args.author) {
        (Some(message), Some(author)) => Some(AddChangelogEntry::new(
            changelog_date(args.date.as_deref())?,
            author,
            message,
        )),
        _ => None,
    };

    // The changelog entry reads the release after the bump.
    let mut passes: Vec<&dyn TransformationPass> = vec![&set_release];
    if let Some(entry) = &changelog {
        passes.push(entry);
    }
    session.transform(&reader, &passes)?;

    let text = session.render(reader)?;
    session.emit(&text, &output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use specker_model::SpeckerConfig;
    use std::fs;
    use tempfile::TempDir;

    fn args(file: PathBuf, message: Option<&str>) -> BumpReleaseArgs {
        BumpReleaseArgs {
            file,
            message: message.map(str::to_string),
            author: message.map(|_| "Jane <jane@example.org>".to_string()),
            date: message.map(|_| "2024-01-02".to_string()),
            output: EditOutput {
                in_place: true,
                output: None,
            },
        }
    }

    #[test]
    fn test_bump_release_in_place() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foo.spec");
        fs::write(&file, "Version: 1.0\nRelease:    4%{?dist}\n").unwrap();

        execute(args(file.clone(), None), &Session::new(SpeckerConfig::default())).unwrap();
        assert_eq!(
            fs::read_to_string(file).unwrap(),
            "Version: 1.0\nRelease:    5%{?dist}\n"
        );
    }

    #[test]
    fn test_bump_release_with_changelog() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foo.spec");
        fs::write(&file, "Version: 1.0\nRelease: 4%{?dist}\n\n%changelog\n- old\n").unwrap();

        let session = Session::new(SpeckerConfig::default());
        execute(args(file.clone(), Some("Rebuilt")), &session).unwrap();
        assert_eq!(
            fs::read_to_string(file).unwrap(),
            "Version: 1.0\nRelease: 5%{?dist}\n\n%changelog\n\
             * Tue Jan 02 2024 Jane <jane@example.org> - 1.0-5\n- Rebuilt\n\n- old\n"
        );
    }

    #[test]
    fn test_bump_release_without_release_tag() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foo.spec");
        fs::write(&file, "Name: foo\n").unwrap();

        let err = execute(args(file, None), &Session::new(SpeckerConfig::default())).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::TagNotFound(_))));
    }

    #[test]
    fn test_autorelease_cannot_be_bumped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foo.spec");
        fs::write(&file, "Release: %autorelease\n").unwrap();

        let err = execute(args(file, None), &Session::new(SpeckerConfig::default())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::UnbumpableRelease(_))
        ));
    }

    #[test]
    fn test_release_at_integer_limit_cannot_be_bumped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foo.spec");
        fs::write(&file, "Release: 18446744073709551615%{?dist}\n").unwrap();

        let err = execute(args(file, None), &Session::new(SpeckerConfig::default())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::UnbumpableRelease(_))
        ));
    }
}
