//! Show command - List the sections of a spec file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use specker_model::{SectionKind, SpecModel, SpecSection};

use crate::session::Session;

#[derive(Args)]
pub struct ShowArgs {
    /// Spec file to inspect
    file: PathBuf,

    /// Print the section list as JSON
    #[arg(long)]
    json: bool,
}

/// One row of the section listing.
#[derive(Debug, Serialize)]
struct SectionRow<'a> {
    index: usize,
    line: usize,
    kind: SectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    lines: usize,
    dirty: bool,
}

impl<'a> SectionRow<'a> {
    fn new(index: usize, section: &'a SpecSection) -> Self {
        Self {
            index,
            line: section.line(),
            kind: section.kind(),
            name: section.name(),
            args: section.args(),
            value: section.value(),
            lines: section.line_count(),
            dirty: section.is_dirty(),
        }
    }

    fn summary(&self) -> String {
        match self.kind {
            SectionKind::Tag => format!(
                "{}: {}",
                self.name.unwrap_or_default(),
                self.value.unwrap_or_default()
            ),
            SectionKind::SectionHeader => match self.args {
                Some(args) => format!("%{} {}", self.name.unwrap_or_default(), args),
                None => format!("%{}", self.name.unwrap_or_default()),
            },
            SectionKind::Macro => format!("%{}", self.name.unwrap_or("?")),
            _ => format!("({} lines)", self.lines),
        }
    }
}

fn rows(model: &SpecModel) -> Vec<SectionRow<'_>> {
    model
        .get_sections()
        .iter()
        .enumerate()
        .map(|(index, section)| SectionRow::new(index, section))
        .collect()
}

fn format_table(rows: &[SectionRow<'_>]) -> String {
    let mut out = format!("{:>5} {:>6}  {:<14} {}\n", "INDEX", "LINE", "KIND", "SECTION");
    for row in rows {
        let marker = if row.dirty { " *" } else { "" };
        out.push_str(&format!(
            "{:>5} {:>6}  {:<14} {}{}\n",
            row.index,
            row.line,
            row.kind.to_string(),
            row.summary(),
            marker
        ));
    }
    out
}

pub fn execute(args: ShowArgs, session: &Session) -> Result<()> {
    let reader = session.open(&args.file)?;
    let guard = reader.borrow();
    let Some(model) = guard.model() else {
        return Ok(());
    };

    let rows = rows(model);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", format_table(&rows));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specker_model::SpecFileReader;

    fn model() -> SpecModel {
        SpecFileReader::new()
            .read(b"Name: foo\n\n%description devel\nFoo.\n")
            .unwrap()
    }

    #[test]
    fn test_rows_follow_document_order() {
        let model = model();
        let rows = rows(&model);
        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Tag,
                SectionKind::Blank,
                SectionKind::SectionHeader,
                SectionKind::SectionBody
            ]
        );
        assert_eq!(rows[2].line, 3);
        assert_eq!(rows[2].summary(), "%description devel");
        assert_eq!(rows[0].summary(), "Name: foo");
    }

    #[test]
    fn test_json_rows() {
        let model = model();
        let json = serde_json::to_value(rows(&model)).unwrap();
        assert_eq!(json[0]["name"], "Name");
        assert_eq!(json[0]["value"], "foo");
        assert_eq!(json[0]["dirty"], false);
        assert_eq!(json[3]["lines"], 1);
        assert!(json[3].get("name").is_none());
    }

    #[test]
    fn test_table_marks_dirty_sections() {
        let mut model = model();
        model.section_mut(0).unwrap().set_value("bar");
        let table = format_table(&rows(&model));
        assert!(table.lines().nth(1).unwrap().ends_with("Name: bar *"));
        assert!(!table.lines().nth(2).unwrap().ends_with('*'));
    }
}
