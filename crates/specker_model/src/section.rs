//! Sections: the syntactic units a spec file is split into.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Separator used between a tag key and its value when none was recorded.
pub const DEFAULT_TAG_SEPARATOR: &str = ": ";

/// The syntactic kind of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// A `Key: value` declaration line.
    Tag,
    /// A `%name args` line opening a section.
    SectionHeader,
    /// The lines owned by the preceding header, or an opaque preamble run.
    SectionBody,
    /// A run of `#` comment lines in the preamble.
    Comment,
    /// A macro or conditional line (`%global`, `%if`, ...), with continuations.
    Macro,
    /// A run of blank lines in the preamble.
    Blank,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Tag => "tag",
            SectionKind::SectionHeader => "section header",
            SectionKind::SectionBody => "section body",
            SectionKind::Comment => "comment",
            SectionKind::Macro => "macro",
            SectionKind::Blank => "blank",
        };
        f.write_str(name)
    }
}

/// Line terminator attached to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    /// Last line of a file without a trailing newline.
    None,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::None => "",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, LineEnding::None)
    }
}

/// One line of structured content, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyLine {
    pub text: String,
    pub ending: LineEnding,
}

impl BodyLine {
    /// Create a line terminated by `\n`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ending: LineEnding::Lf,
        }
    }

    pub fn with_ending(mut self, ending: LineEnding) -> Self {
        self.ending = ending;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub(crate) fn push_to(&self, out: &mut String) {
        out.push_str(&self.text);
        out.push_str(self.ending.as_str());
    }
}

/// A syntactic unit of a spec file.
///
/// A section is either pristine (it renders as `raw_text`) or dirty (it is
/// re-synthesized from its structured fields). Every mutator marks the
/// section dirty; `raw_text` itself is never rewritten by mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSection {
    kind: SectionKind,
    raw_text: String,
    name: Option<String>,
    args: Option<String>,
    value: Option<String>,
    separator: Option<String>,
    lines: Vec<BodyLine>,
    ending: LineEnding,
    line: usize,
    dirty: bool,
}

impl SpecSection {
    fn empty(kind: SectionKind) -> Self {
        Self {
            kind,
            raw_text: String::new(),
            name: None,
            args: None,
            value: None,
            separator: None,
            lines: Vec::new(),
            ending: LineEnding::Lf,
            line: 0,
            dirty: true,
        }
    }

    /// Create a new (dirty) tag section.
    pub fn tag(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut section = Self::empty(SectionKind::Tag);
        section.name = Some(key.into());
        section.value = Some(value.into());
        section.separator = Some(DEFAULT_TAG_SEPARATOR.to_string());
        section
    }

    /// Create a new (dirty) section header. A leading `%` in `name` is dropped.
    pub fn header(name: &str, args: Option<&str>) -> Self {
        let mut section = Self::empty(SectionKind::SectionHeader);
        section.name = Some(name.trim_start_matches('%').to_string());
        section.args = args.filter(|a| !a.is_empty()).map(str::to_string);
        section
    }

    /// Create a new (dirty) section body.
    pub fn body(lines: Vec<BodyLine>) -> Self {
        let mut section = Self::empty(SectionKind::SectionBody);
        section.lines = lines;
        section
    }

    /// Create a new (dirty) comment block.
    pub fn comment(lines: Vec<BodyLine>) -> Self {
        let mut section = Self::empty(SectionKind::Comment);
        section.lines = lines;
        section
    }

    /// Create a new (dirty) run of `count` empty lines.
    pub fn blank(count: usize) -> Self {
        let mut section = Self::empty(SectionKind::Blank);
        section.lines = (0..count).map(|_| BodyLine::new("")).collect();
        section
    }

    /// Create a new (dirty) single-line macro.
    pub fn macro_line(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut section = Self::empty(SectionKind::Macro);
        section.name = macro_directive(&text);
        section.lines = vec![BodyLine::new(text)];
        section
    }

    /// Create a pristine section from parsed input.
    pub(crate) fn parsed(kind: SectionKind, line: usize) -> Self {
        Self {
            line,
            dirty: false,
            ..Self::empty(kind)
        }
    }

    pub(crate) fn push_raw(&mut self, text: &str, ending: LineEnding) {
        self.raw_text.push_str(text);
        self.raw_text.push_str(ending.as_str());
    }

    pub(crate) fn push_parsed_line(&mut self, text: &str, ending: LineEnding) {
        self.push_raw(text, ending);
        self.lines.push(BodyLine {
            text: text.to_string(),
            ending,
        });
    }

    pub(crate) fn set_parsed_tag(&mut self, key: &str, separator: &str, value: &str, ending: LineEnding) {
        self.name = Some(key.to_string());
        self.separator = Some(separator.to_string());
        self.value = Some(value.to_string());
        self.ending = ending;
    }

    pub(crate) fn set_parsed_header(&mut self, name: &str, args: Option<&str>, ending: LineEnding) {
        self.name = Some(name.to_string());
        self.args = args.map(str::to_string);
        self.ending = ending;
    }

    pub(crate) fn set_parsed_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// The exact text this section was parsed from; empty for new sections.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Tag key, header name (without `%`) or macro directive.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Alias of [`SpecSection::name`] for tag sections.
    pub fn key(&self) -> Option<&str> {
        self.name()
    }

    pub fn args(&self) -> Option<&str> {
        self.args.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    pub fn lines(&self) -> &[BodyLine] {
        &self.lines
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// 1-based line number in the parsed input, 0 for new sections.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_pristine(&self) -> bool {
        !self.dirty
    }

    pub fn is_tag(&self, key: &str) -> bool {
        self.kind == SectionKind::Tag
            && self
                .name
                .as_deref()
                .map_or(false, |name| name.eq_ignore_ascii_case(key))
    }

    /// Whether this is a header for `name`, given with or without `%`.
    pub fn is_header(&self, name: &str) -> bool {
        let wanted = name.trim_start_matches('%');
        self.kind == SectionKind::SectionHeader
            && self.name.as_deref().map_or(false, |n| n == wanted)
    }

    /// Number of input lines covered by this section.
    pub fn line_count(&self) -> usize {
        match self.kind {
            SectionKind::Tag | SectionKind::SectionHeader => 1,
            _ => self.lines.len(),
        }
    }

    /// Terminator of the last line of this section.
    pub fn last_ending(&self) -> LineEnding {
        match self.kind {
            SectionKind::Tag | SectionKind::SectionHeader => self.ending,
            _ => self
                .lines
                .last()
                .map(|line| line.ending)
                .unwrap_or(LineEnding::Lf),
        }
    }

    /// Body lines joined with `\n`, without a trailing terminator.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.dirty = true;
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.name = Some(key.into());
        self.dirty = true;
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = Some(separator.into());
        self.dirty = true;
    }

    pub fn set_args(&mut self, args: Option<&str>) {
        self.args = args.filter(|a| !a.is_empty()).map(str::to_string);
        self.dirty = true;
    }

    pub fn set_lines(&mut self, lines: Vec<BodyLine>) {
        self.lines = lines;
        self.dirty = true;
    }

    /// Mutable access to the structured lines; marks the section dirty.
    pub fn lines_mut(&mut self) -> &mut Vec<BodyLine> {
        self.dirty = true;
        &mut self.lines
    }

    pub fn set_ending(&mut self, ending: LineEnding) {
        self.ending = ending;
        self.dirty = true;
    }

    /// Make sure the last line carries a terminator.
    ///
    /// A pristine section keeps rendering verbatim: the terminator is appended
    /// to `raw_text` as well as to the structured fields.
    pub(crate) fn terminate(&mut self, ending: LineEnding) {
        if !self.last_ending().is_none() {
            return;
        }
        if !self.dirty {
            self.raw_text.push_str(ending.as_str());
        }
        match self.kind {
            SectionKind::Tag | SectionKind::SectionHeader => self.ending = ending,
            _ => {
                if let Some(last) = self.lines.last_mut() {
                    last.ending = ending;
                }
            }
        }
    }

    /// Check that the structured fields agree with the section kind.
    pub fn validate(&self, index: usize) -> SpecResult<()> {
        let fail = |message: &str| Err(SpecError::invalid_section(index, self.kind, message));

        if self
            .lines
            .iter()
            .any(|line| has_line_break(&line.text) || fuses_with_ending(&line.text, line.ending))
        {
            return fail("line contains an embedded line break");
        }

        match self.kind {
            SectionKind::Tag => {
                let key = match self.name.as_deref() {
                    Some(key) if !key.trim().is_empty() => key,
                    _ => return fail("tag has no key"),
                };
                let value = match self.value.as_deref() {
                    Some(value) => value,
                    None => return fail("tag has no value"),
                };
                if has_line_break(key)
                    || has_line_break(value)
                    || fuses_with_ending(value, self.ending)
                {
                    return fail("tag key or value spans multiple lines");
                }
                if let Some(separator) = self.separator.as_deref() {
                    if !separator.contains(':') || has_line_break(separator) {
                        return fail("tag separator must be a single-line colon");
                    }
                }
                if !self.lines.is_empty() {
                    return fail("tag carries body lines");
                }
            }
            SectionKind::SectionHeader => {
                let name = match self.name.as_deref() {
                    Some(name) if !name.is_empty() => name,
                    _ => return fail("section header has no name"),
                };
                if name.chars().any(char::is_whitespace) {
                    return fail("section header name contains whitespace");
                }
                if self.args.as_deref().map_or(false, has_line_break) {
                    return fail("section header arguments span multiple lines");
                }
                if !self.lines.is_empty() {
                    return fail("section header carries body lines");
                }
            }
            SectionKind::SectionBody => {
                if self.value.is_some() {
                    return fail("section body carries a tag value");
                }
            }
            SectionKind::Comment => {
                if self.lines.is_empty() {
                    return fail("comment block has no lines");
                }
                if self
                    .lines
                    .iter()
                    .any(|line| !line.text.trim_start().starts_with('#'))
                {
                    return fail("comment line does not start with '#'");
                }
            }
            SectionKind::Macro => match self.lines.first() {
                Some(first) if first.text.trim_start().starts_with('%') => {}
                Some(_) => return fail("macro line does not start with '%'"),
                None => return fail("macro has no lines"),
            },
            SectionKind::Blank => {
                if self.lines.iter().any(|line| !line.is_blank()) {
                    return fail("blank run contains text");
                }
            }
        }

        Ok(())
    }
}

/// A lone `\r` is ordinary text; only `\n` splits lines.
fn has_line_break(text: &str) -> bool {
    text.contains('\n')
}

/// A trailing `\r` would merge with an `\n` terminator into `\r\n`.
fn fuses_with_ending(text: &str, ending: LineEnding) -> bool {
    text.ends_with('\r') && ending == LineEnding::Lf
}

/// Extract the directive name of a macro line: `%global` → `global`,
/// `%{?systemd_requires}` → `systemd_requires`.
pub(crate) fn macro_directive(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix('%')?;
    let rest = rest.strip_prefix('{').unwrap_or(rest);
    let rest = rest.trim_start_matches(['?', '!']);
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
