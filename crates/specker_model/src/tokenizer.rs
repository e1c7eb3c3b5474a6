//! Line splitting and line classification for the RPM spec dialect.

use std::collections::HashSet;

use regex::Regex;

use crate::section::LineEnding;

/// Section names that open a `%name` block.
pub const SECTION_NAMES: &[&str] = &[
    "package",
    "description",
    "prep",
    "build",
    "install",
    "check",
    "clean",
    "files",
    "changelog",
    "pre",
    "post",
    "preun",
    "postun",
    "pretrans",
    "posttrans",
    "preuntrans",
    "postuntrans",
    "verifyscript",
    "trigger",
    "triggerprein",
    "triggerin",
    "triggerun",
    "triggerpostun",
    "filetriggerin",
    "filetriggerun",
    "filetriggerpostun",
    "transfiletriggerin",
    "transfiletriggerun",
    "transfiletriggerpostun",
    "generate_buildrequires",
    "conf",
    "sourcelist",
    "patchlist",
];

/// Sections whose header is followed by preamble tags instead of a body.
pub const PREAMBLE_SECTIONS: &[&str] = &["package"];

/// One physical input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub text: &'a str,
    pub ending: LineEnding,
    /// 1-based line number.
    pub number: usize,
}

/// Split `input` into lines, keeping track of each line's terminator.
pub fn split_lines(input: &str) -> Vec<RawLine<'_>> {
    input
        .split_inclusive('\n')
        .enumerate()
        .map(|(i, piece)| {
            let (text, ending) = if let Some(text) = piece.strip_suffix("\r\n") {
                (text, LineEnding::CrLf)
            } else if let Some(text) = piece.strip_suffix('\n') {
                (text, LineEnding::Lf)
            } else {
                (piece, LineEnding::None)
            };
            RawLine {
                text,
                ending,
                number: i + 1,
            }
        })
        .collect()
}

/// Syntactic class of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    Blank,
    Comment,
    SectionHeader {
        name: &'a str,
        args: Option<&'a str>,
    },
    /// A macro or conditional; `continued` when the line ends with `\`.
    Macro { continued: bool },
    Tag {
        key: &'a str,
        separator: &'a str,
        value: &'a str,
    },
    /// Anything else. Kept as opaque content.
    Text,
}

/// Classifies lines of RPM spec text.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    tag_pattern: Regex,
    header_pattern: Regex,
    section_names: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            // Key, optional (qualifier), colon with surrounding blanks, value
            tag_pattern: Regex::new(
                r"^([A-Za-z][A-Za-z0-9_]*(?:\([^)]*\))?)([ \t]*:[ \t]*)(.*?)[ \t]*$",
            )
            .unwrap(),
            header_pattern: Regex::new(r"^%([A-Za-z_][A-Za-z0-9_]*)(?:[ \t]+(.*?))?[ \t]*$")
                .unwrap(),
            section_names: SECTION_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Also treat `%name` as a section header.
    pub fn with_section(mut self, name: &str) -> Self {
        self.section_names
            .insert(name.trim_start_matches('%').to_string());
        self
    }

    pub fn is_section_name(&self, name: &str) -> bool {
        self.section_names.contains(name)
    }

    pub fn classify<'a>(&self, text: &'a str) -> LineClass<'a> {
        let trimmed = text.trim_start();

        if trimmed.trim_end().is_empty() {
            return LineClass::Blank;
        }

        if trimmed.starts_with('#') {
            return LineClass::Comment;
        }

        if let Some(caps) = self.header_pattern.captures(text) {
            if let Some(name) = caps.get(1) {
                if self.is_section_name(name.as_str()) {
                    let args = caps
                        .get(2)
                        .map(|m| m.as_str())
                        .filter(|a| !a.is_empty());
                    return LineClass::SectionHeader {
                        name: name.as_str(),
                        args,
                    };
                }
            }
        }

        if trimmed.starts_with('%') {
            return LineClass::Macro {
                continued: ends_with_continuation(text),
            };
        }

        if let Some(caps) = self.tag_pattern.captures(text) {
            if let (Some(key), Some(separator), Some(value)) = (caps.get(1), caps.get(2), caps.get(3)) {
                // `http://...` is a URL, not a tag named `http`
                if separator.as_str() == ":" && value.as_str().starts_with("//") {
                    return LineClass::Text;
                }
                return LineClass::Tag {
                    key: key.as_str(),
                    separator: separator.as_str(),
                    value: value.as_str(),
                };
            }
        }

        LineClass::Text
    }
}

/// Whether a macro line continues onto the next line.
pub fn ends_with_continuation(text: &str) -> bool {
    text.trim_end().ends_with('\\')
}
