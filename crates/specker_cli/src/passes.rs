//! Transformation passes driven by the CLI commands.

use chrono::NaiveDate;
use tracing::debug;

use specker_model::{
    BodyLine, SectionKind, SpecModelManipulator, SpecResult, SpecSection, TransformationPass,
};

const CHANGELOG: &str = "%changelog";

/// Set a tag, adding it to the preamble when it does not exist yet.
pub struct SetTag {
    name: String,
    value: String,
}

impl SetTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl TransformationPass for SetTag {
    fn name(&self) -> &str {
        "set-tag"
    }

    fn apply(&self, manipulator: &mut dyn SpecModelManipulator) -> SpecResult<()> {
        if !manipulator.set_tag_value(&self.name, &self.value) {
            let index = manipulator.add_tag(&self.name, &self.value)?;
            debug!("Added tag {} at section {}", self.name, index);
        }
        Ok(())
    }
}

/// Increment the last number of a release before its macro suffix:
/// `4%{?dist}` becomes `5%{?dist}`, `0.3.rc1` becomes `0.3.rc2`.
pub fn bump_release(release: &str) -> Option<String> {
    let split = release.find('%').unwrap_or(release.len());
    let (head, suffix) = release.split_at(split);

    let end = head.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = head[..end]
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    let number: u64 = head[start..end].parse().ok()?;

    Some(format!(
        "{}{}{}{}",
        &head[..start],
        number.checked_add(1)?,
        &head[end..],
        suffix
    ))
}

/// Prepend a `%changelog` entry, creating the section when it is missing.
///
/// The entry header carries `[epoch:]version-release` read from the model at
/// apply time, so a preceding release bump is reflected.
pub struct AddChangelogEntry {
    date: NaiveDate,
    author: String,
    message: String,
}

impl AddChangelogEntry {
    pub fn new(date: NaiveDate, author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            date,
            author: author.into(),
            message: message.into(),
        }
    }

    fn entry_header(&self, manipulator: &dyn SpecModelManipulator) -> String {
        let mut header = format!("* {} {}", self.date.format("%a %b %d %Y"), self.author);
        if let Some(evr) = evr(manipulator) {
            header.push_str(" - ");
            header.push_str(&evr);
        }
        header
    }

    fn entry_lines(&self) -> Vec<String> {
        self.message
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                if line.starts_with('-') {
                    line.to_string()
                } else {
                    format!("- {}", line)
                }
            })
            .collect()
    }
}

impl TransformationPass for AddChangelogEntry {
    fn name(&self) -> &str {
        "add-changelog-entry"
    }

    fn apply(&self, manipulator: &mut dyn SpecModelManipulator) -> SpecResult<()> {
        let mut entry = vec![self.entry_header(manipulator)];
        entry.extend(self.entry_lines());

        let existing = manipulator.section_body_lines(CHANGELOG).map(|lines| {
            lines.iter().any(|line| !line.is_blank())
        });
        match existing {
            Some(has_entries) => {
                if has_entries {
                    entry.push(String::new());
                }
                let lines: Vec<&str> = entry.iter().map(String::as_str).collect();
                manipulator.prepend_section_body(CHANGELOG, &lines)?;
            }
            None => {
                append_changelog_section(manipulator)?;
                let lines: Vec<&str> = entry.iter().map(String::as_str).collect();
                manipulator.append_section_body(CHANGELOG, &lines)?;
            }
        }
        Ok(())
    }
}

fn append_changelog_section(manipulator: &mut dyn SpecModelManipulator) -> SpecResult<()> {
    let ending = manipulator.model().line_ending();
    let sections = manipulator.get_sections();
    let needs_gap = sections
        .last()
        .map(|s| s.kind() != SectionKind::Blank)
        .unwrap_or(false);

    let mut index = sections.len();
    if needs_gap {
        let mut gap = SpecSection::blank(0);
        gap.set_lines(vec![BodyLine::new("").with_ending(ending)]);
        manipulator.insert_section(index, gap)?;
        index += 1;
    }

    let mut header = SpecSection::header(CHANGELOG, None);
    header.set_ending(ending);
    manipulator.insert_section(index, header)
}

/// `[epoch:]version-release` with macros dropped from the release.
fn evr(manipulator: &dyn SpecModelManipulator) -> Option<String> {
    let version = manipulator.tag_value("Version")?;
    let mut evr = match manipulator.tag_value("Epoch") {
        Some(epoch) => format!("{}:{}", epoch, version),
        None => version.to_string(),
    };
    if let Some(release) = manipulator.tag_value("Release") {
        let release = release.split('%').next().unwrap_or_default();
        if !release.is_empty() {
            evr.push('-');
            evr.push_str(release);
        }
    }
    Some(evr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use specker_model::{
        shared, OriginalLayoutRenderer, SpecFileReader, SpecModel, SpecModelRenderer,
        SpecModelTransformator,
    };

    fn parse(text: &str) -> SpecModel {
        SpecFileReader::new().read(text.as_bytes()).unwrap()
    }

    fn run(text: &str, passes: &[&dyn TransformationPass]) -> String {
        let mut transformator = SpecModelTransformator::new(Some(parse(text)));
        transformator.apply_all(passes).unwrap();
        OriginalLayoutRenderer::new(shared(SpecFileReader::new()))
            .render_model(transformator.get_model())
            .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn test_bump_release() {
        assert_eq!(bump_release("4%{?dist}").as_deref(), Some("5%{?dist}"));
        assert_eq!(bump_release("1").as_deref(), Some("2"));
        assert_eq!(bump_release("9.fc40").as_deref(), Some("9.fc41"));
        assert_eq!(bump_release("0.3.rc1%{?dist}").as_deref(), Some("0.3.rc2%{?dist}"));
        assert_eq!(bump_release("%autorelease"), None);
        assert_eq!(bump_release("alpha"), None);
        assert_eq!(bump_release("18446744073709551615%{?dist}"), None);
    }

    #[test]
    fn test_set_tag_updates_existing() {
        let output = run("Name:    foo\nVersion: 1\n", &[&SetTag::new("version", "2")]);
        assert_eq!(output, "Name:    foo\nVersion: 2\n");
    }

    #[test]
    fn test_set_tag_adds_missing() {
        let output = run(
            "Name: foo\nVersion: 1\n\n%description\nFoo.\n",
            &[&SetTag::new("License", "MIT")],
        );
        assert_eq!(output, "Name: foo\nVersion: 1\nLicense: MIT\n\n%description\nFoo.\n");
    }

    #[test]
    fn test_changelog_entry_is_prepended() {
        let text = "Version: 1.0\nRelease: 2%{?dist}\n%changelog\n* Mon Jan 01 2024 A <a@b> - 1.0-1\n- Old\n";
        let entry = AddChangelogEntry::new(date(), "B <b@c>", "Fix build");
        let output = run(text, &[&entry]);
        assert_eq!(
            output,
            "Version: 1.0\nRelease: 2%{?dist}\n%changelog\n\
             * Tue Jan 02 2024 B <b@c> - 1.0-2\n- Fix build\n\n\
             * Mon Jan 01 2024 A <a@b> - 1.0-1\n- Old\n"
        );
    }

    #[test]
    fn test_changelog_entry_sees_bumped_release() {
        let text = "Epoch: 1\nVersion: 1.0\nRelease: 2%{?dist}\n%changelog\n";
        let bump = SetTag::new("Release", "3%{?dist}");
        let entry = AddChangelogEntry::new(date(), "B <b@c>", "- Rebuilt");
        let output = run(text, &[&bump, &entry]);
        assert_eq!(
            output,
            "Epoch: 1\nVersion: 1.0\nRelease: 3%{?dist}\n%changelog\n\
             * Tue Jan 02 2024 B <b@c> - 1:1.0-3\n- Rebuilt\n"
        );
    }

    #[test]
    fn test_changelog_section_is_created() {
        let entry = AddChangelogEntry::new(date(), "B <b@c>", "First");
        let output = run("Name: foo\nVersion: 1", &[&entry]);
        assert_eq!(
            output,
            "Name: foo\nVersion: 1\n\n%changelog\n* Tue Jan 02 2024 B <b@c> - 1\n- First\n"
        );
    }

    #[test]
    fn test_changelog_keeps_crlf() {
        let text = "Version: 1\r\nRelease: 1\r\n\r\n%changelog\r\n- old\r\n";
        let entry = AddChangelogEntry::new(date(), "B", "New");
        let output = run(text, &[&entry]);
        assert_eq!(
            output,
            "Version: 1\r\nRelease: 1\r\n\r\n%changelog\r\n* Tue Jan 02 2024 B - 1-1\r\n- New\r\n\r\n- old\r\n"
        );
    }
}
