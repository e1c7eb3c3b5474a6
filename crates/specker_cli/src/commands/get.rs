//! Get command - Print the value of a tag.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use specker_model::SpecModelManipulator;

use crate::error::CliError;
use crate::session::Session;

#[derive(Args)]
pub struct GetArgs {
    /// Spec file to read
    file: PathBuf,

    /// Tag name (case-insensitive), e.g. `Version` or `Requires(post)`
    tag: String,

    /// Print every value of a repeated tag, one per line
    #[arg(short, long)]
    all: bool,
}

pub fn execute(args: GetArgs, session: &Session) -> Result<()> {
    for value in lookup(&args, session)? {
        println!("{}", value);
    }
    Ok(())
}

fn lookup(args: &GetArgs, session: &Session) -> Result<Vec<String>> {
    let reader = session.open(&args.file)?;
    let guard = reader.borrow();
    let Some(model) = guard.model() else {
        return Ok(Vec::new());
    };

    let values: Vec<String> = if args.all {
        model
            .find_tags(&args.tag)
            .into_iter()
            .filter_map(|s| s.value())
            .map(str::to_string)
            .collect()
    } else {
        model.tag_value(&args.tag).map(str::to_string).into_iter().collect()
    };

    if values.is_empty() {
        return Err(CliError::TagNotFound(args.tag.clone()).into());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use specker_model::SpeckerConfig;
    use std::fs;
    use tempfile::TempDir;

    const SPEC: &str = "Name: foo\nBuildRequires: gcc\nBuildRequires: make\n";

    fn args(dir: &TempDir, tag: &str, all: bool) -> GetArgs {
        let file = dir.path().join("foo.spec");
        fs::write(&file, SPEC).unwrap();
        GetArgs {
            file,
            tag: tag.to_string(),
            all,
        }
    }

    #[test]
    fn test_get_first_value() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(SpeckerConfig::default());
        assert_eq!(lookup(&args(&dir, "buildrequires", false), &session).unwrap(), vec!["gcc"]);
    }

    #[test]
    fn test_get_all_values() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(SpeckerConfig::default());
        assert_eq!(
            lookup(&args(&dir, "BuildRequires", true), &session).unwrap(),
            vec!["gcc", "make"]
        );
    }

    #[test]
    fn test_get_missing_tag() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(SpeckerConfig::default());
        let err = lookup(&args(&dir, "Epoch", false), &session).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::TagNotFound(tag)) if tag == "Epoch"
        ));
    }
}
