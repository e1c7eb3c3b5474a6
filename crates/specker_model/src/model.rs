//! The in-memory spec document.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::section::{LineEnding, SectionKind, SpecSection};

/// An ordered sequence of sections; insertion order is document order.
///
/// Read-only queries never reorder sections. A section header owns the
/// section body that immediately follows it, and a header owns at most one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecModel {
    sections: Vec<SpecSection>,
    line_ending: LineEnding,
}

impl SpecModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(sections: Vec<SpecSection>, line_ending: LineEnding) -> Self {
        Self {
            sections,
            line_ending,
        }
    }

    pub fn get_sections(&self) -> &[SpecSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SpecSection> {
        self.sections.get(index)
    }

    /// Line ending used for lines created programmatically.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, ending: LineEnding) {
        if !ending.is_none() {
            self.line_ending = ending;
        }
    }

    /// Whether any section has been modified since parsing.
    pub fn is_dirty(&self) -> bool {
        self.sections.iter().any(SpecSection::is_dirty)
    }

    /// First tag whose key matches `name` case-insensitively.
    pub fn find_tag(&self, name: &str) -> Option<&SpecSection> {
        self.sections.iter().find(|s| s.is_tag(name))
    }

    pub fn find_tag_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.is_tag(name))
    }

    /// All tags whose key matches `name`, in document order.
    pub fn find_tags(&self, name: &str) -> Vec<&SpecSection> {
        self.sections.iter().filter(|s| s.is_tag(name)).collect()
    }

    /// First section header named `header_name` (`"%changelog"` or `"changelog"`).
    pub fn find_section(&self, header_name: &str) -> Option<&SpecSection> {
        self.sections.iter().find(|s| s.is_header(header_name))
    }

    pub fn find_section_index(&self, header_name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.is_header(header_name))
    }

    /// First header named `header_name` whose arguments equal `args`
    /// (whitespace-normalized), e.g. `("%description", Some("devel"))`.
    pub fn find_section_with_args(&self, header_name: &str, args: Option<&str>) -> Option<usize> {
        let wanted = normalize_args(args);
        self.sections
            .iter()
            .position(|s| s.is_header(header_name) && normalize_args(s.args()) == wanted)
    }

    /// Index of the body owned by the header at `header_index`.
    pub fn body_index(&self, header_index: usize) -> Option<usize> {
        let header = self.sections.get(header_index)?;
        if header.kind() != SectionKind::SectionHeader {
            return None;
        }
        let next = header_index + 1;
        match self.sections.get(next) {
            Some(section) if section.kind() == SectionKind::SectionBody => Some(next),
            _ => None,
        }
    }

    /// Body owned by the first header named `header_name`.
    pub fn section_body(&self, header_name: &str) -> Option<&SpecSection> {
        let header = self.find_section_index(header_name)?;
        self.body_index(header).and_then(|i| self.sections.get(i))
    }

    pub fn section_mut(&mut self, index: usize) -> SpecResult<&mut SpecSection> {
        let len = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(SpecError::IndexOutOfRange { index, len })
    }

    /// Insert `section` at `index` (`0..=len`).
    ///
    /// A section body may not be placed next to another section body. When
    /// the preceding section ends without a terminator, it is terminated with
    /// the model's line ending so the two lines do not fuse.
    pub fn insert_section(&mut self, index: usize, section: SpecSection) -> SpecResult<()> {
        let len = self.sections.len();
        if index > len {
            return Err(SpecError::IndexOutOfRange { index, len });
        }

        if section.kind() == SectionKind::SectionBody {
            let before = index.checked_sub(1).and_then(|i| self.sections.get(i));
            let after = self.sections.get(index);
            let adjacent_body = [before, after]
                .into_iter()
                .flatten()
                .any(|s| s.kind() == SectionKind::SectionBody);
            if adjacent_body {
                return Err(SpecError::invalid_section(
                    index,
                    SectionKind::SectionBody,
                    "a header owns at most one section body",
                ));
            }
        }

        let ending = self.line_ending;
        if let Some(previous) = index.checked_sub(1).and_then(|i| self.sections.get_mut(i)) {
            previous.terminate(ending);
        }
        self.sections.insert(index, section);
        Ok(())
    }

    /// Append `section` at the end of the document.
    pub fn push_section(&mut self, section: SpecSection) -> SpecResult<()> {
        self.insert_section(self.sections.len(), section)
    }

    /// Remove and return the section at `index`.
    pub fn remove_section(&mut self, index: usize) -> SpecResult<SpecSection> {
        let len = self.sections.len();
        if index >= len {
            return Err(SpecError::IndexOutOfRange { index, len });
        }
        Ok(self.sections.remove(index))
    }
}

fn normalize_args(args: Option<&str>) -> String {
    args.unwrap_or("").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::BodyLine;

    fn sample() -> SpecModel {
        let mut model = SpecModel::new();
        model.push_section(SpecSection::tag("Name", "foo")).unwrap();
        model.push_section(SpecSection::tag("Version", "1.0")).unwrap();
        model
            .push_section(SpecSection::header("%description", None))
            .unwrap();
        model
            .push_section(SpecSection::body(vec![BodyLine::new("A tool.")]))
            .unwrap();
        model
    }

    #[test]
    fn test_find_tag() {
        let model = sample();
        assert_eq!(model.find_tag("version").and_then(|s| s.value()), Some("1.0"));
        assert!(model.find_tag("NoSuchTag").is_none());
        assert_eq!(model.find_tag_index("Name"), Some(0));
    }

    #[test]
    fn test_find_section_with_or_without_percent() {
        let model = sample();
        assert_eq!(model.find_section_index("%description"), Some(2));
        assert_eq!(model.find_section_index("description"), Some(2));
        assert_eq!(model.body_index(2), Some(3));
        assert_eq!(model.section_body("%description").unwrap().text(), "A tool.");
        assert!(model.find_section("%changelog").is_none());
    }

    #[test]
    fn test_find_section_with_args() {
        let mut model = sample();
        model
            .push_section(SpecSection::header("%description", Some("-n  devel")))
            .unwrap();
        assert_eq!(model.find_section_with_args("%description", None), Some(2));
        assert_eq!(
            model.find_section_with_args("%description", Some("-n devel")),
            Some(4)
        );
    }

    #[test]
    fn test_insert_and_remove_preserve_order() {
        let mut model = sample();
        model
            .insert_section(1, SpecSection::tag("Release", "1"))
            .unwrap();
        let keys: Vec<_> = model
            .get_sections()
            .iter()
            .filter_map(|s| s.key())
            .collect();
        assert_eq!(keys, vec!["Name", "Release", "Version", "description"]);

        let removed = model.remove_section(0).unwrap();
        assert_eq!(removed.key(), Some("Name"));
        assert_eq!(model.get(0).and_then(|s| s.key()), Some("Release"));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut model = sample();
        let len = model.len();
        assert!(matches!(
            model.insert_section(len + 1, SpecSection::tag("X", "y")),
            Err(SpecError::IndexOutOfRange { index, len: l }) if index == len + 1 && l == len
        ));
        assert!(matches!(
            model.remove_section(len),
            Err(SpecError::IndexOutOfRange { .. })
        ));
        assert!(model.section_mut(99).is_err());
    }

    #[test]
    fn test_rejects_second_body_for_header() {
        let mut model = sample();
        let err = model
            .insert_section(3, SpecSection::body(vec![BodyLine::new("again")]))
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidSectionState { .. }));
    }

    #[test]
    fn test_queries_do_not_reorder() {
        let model = sample();
        let before = model.clone();
        let _ = model.find_tags("name");
        let _ = model.find_section("description");
        assert_eq!(model, before);
    }
}
