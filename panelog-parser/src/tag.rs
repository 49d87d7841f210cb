use crate::progress::{ProgressPattern, ProgressUpdate, default_patterns, extract_progress};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    // `[#panel]` selects a panel, `[@panel]` marks a progress line for a panel
    static ref MARKER_RE: Regex =
        Regex::new(r"\[(?P<sigil>[#@])(?P<name>[A-Za-z0-9_]+)\]").unwrap();
}

/// true when `name` can appear inside a `[#name]` marker
pub fn is_valid_panel_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// which marker selected the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `[#name]`: a regular message
    Panel,
    /// `[@name]`: a progress report; it updates the bar instead of adding a line
    Progress,
}

/// a line that carried a panel marker
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedLine {
    pub panel_name: String,
    pub kind: TagKind,
    /// the line with its marker removed
    pub text: String,
    pub progress_update: Option<ProgressUpdate>,
}

/// outcome of classifying a raw line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Tagged(TaggedLine),
    Untagged {
        text: String,
        progress_update: Option<ProgressUpdate>,
    },
}

impl ParsedLine {
    pub fn panel_name(&self) -> Option<&str> {
        match self {
            ParsedLine::Tagged(line) => Some(line.panel_name.as_str()),
            ParsedLine::Untagged { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ParsedLine::Tagged(line) => &line.text,
            ParsedLine::Untagged { text, .. } => text,
        }
    }

    pub fn progress_update(&self) -> Option<&ProgressUpdate> {
        match self {
            ParsedLine::Tagged(line) => line.progress_update.as_ref(),
            ParsedLine::Untagged {
                progress_update, ..
            } => progress_update.as_ref(),
        }
    }
}

/// returned by [`TagParser::parse`] when a line has no panel marker
///
/// This is the normal result for untagged lines, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSkip;

impl fmt::Display for ParseSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("line has no panel marker")
    }
}

/// splits raw log lines into panel marker, display text and progress
///
/// The marker is stripped from the displayed text: `"12:00 [#net]up"` is shown
/// as `"12:00 up"` in panel `net`. Only the first marker in a line counts.
#[derive(Debug, Clone)]
pub struct TagParser {
    progress_patterns: Vec<ProgressPattern>,
}

impl TagParser {
    pub fn new() -> Self {
        Self {
            progress_patterns: default_patterns(),
        }
    }

    /// replaces the progress notations; an empty list turns progress extraction off
    pub fn with_progress_patterns(mut self, patterns: Vec<ProgressPattern>) -> Self {
        self.progress_patterns = patterns;
        self
    }

    pub fn progress_patterns(&self) -> &[ProgressPattern] {
        &self.progress_patterns
    }

    pub fn parse(&self, raw: &str) -> Result<TaggedLine, ParseSkip> {
        let line = trim_line_ending(raw);
        let caps = MARKER_RE.captures(line).ok_or(ParseSkip)?;

        let (Some(marker), Some(name)) = (caps.get(0), caps.name("name")) else {
            return Err(ParseSkip);
        };
        let kind = match caps.name("sigil").map(|m| m.as_str()) {
            Some("@") => TagKind::Progress,
            _ => TagKind::Panel,
        };

        let text = join_around_marker(&line[..marker.start()], &line[marker.end()..]);
        let progress_update = self.extract_progress(&text);

        Ok(TaggedLine {
            panel_name: name.as_str().to_string(),
            kind,
            text,
            progress_update,
        })
    }

    pub fn classify(&self, raw: &str) -> ParsedLine {
        match self.parse(raw) {
            Ok(tagged) => ParsedLine::Tagged(tagged),
            Err(ParseSkip) => {
                let text = trim_line_ending(raw).to_string();
                let progress_update = self.extract_progress(&text);
                ParsedLine::Untagged {
                    text,
                    progress_update,
                }
            }
        }
    }

    pub fn extract_progress(&self, text: &str) -> Option<ProgressUpdate> {
        extract_progress(&self.progress_patterns, text)
    }
}

impl Default for TagParser {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_line_ending(raw: &str) -> &str {
    raw.trim_end_matches(['\r', '\n'])
}

fn join_around_marker(before: &str, after: &str) -> String {
    let before = before.trim_end();
    let after = after.trim_start();
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (false, true) => before.to_string(),
        (false, false) => format!("{} {}", before, after),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_panel_names() {
        assert!(is_valid_panel_name("net"));
        assert!(is_valid_panel_name("worker_2"));
        assert!(!is_valid_panel_name(""));
        assert!(!is_valid_panel_name("my-panel"));
        assert!(!is_valid_panel_name("two words"));
        assert!(!is_valid_panel_name("café"));
    }

    #[test]
    fn test_leading_marker() {
        let line = TagParser::new().parse("[#net]connection up").unwrap();
        assert_eq!(line.panel_name, "net");
        assert_eq!(line.kind, TagKind::Panel);
        assert_eq!(line.text, "connection up");
        assert!(line.progress_update.is_none());
    }

    #[test]
    fn test_marker_in_the_middle() {
        let line = TagParser::new()
            .parse("2025-01-15 10:30:00 INFO [#worker_2]job finished")
            .unwrap();
        assert_eq!(line.panel_name, "worker_2");
        assert_eq!(line.text, "2025-01-15 10:30:00 INFO job finished");
    }

    #[test]
    fn test_no_marker_is_skipped() {
        assert_eq!(TagParser::new().parse("plain message"), Err(ParseSkip));
        assert_eq!(TagParser::new().parse("[info] not a panel"), Err(ParseSkip));
        assert_eq!(TagParser::new().parse("[#] empty name"), Err(ParseSkip));
        assert_eq!(TagParser::new().parse("[#bad-name]x"), Err(ParseSkip));
    }

    #[test]
    fn test_only_first_marker_counts() {
        let line = TagParser::new().parse("[#a]forwarded to [#b]").unwrap();
        assert_eq!(line.panel_name, "a");
        assert_eq!(line.text, "forwarded to [#b]");
    }

    #[test]
    fn test_progress_marker() {
        let line = TagParser::new().parse("[@system]update 30%").unwrap();
        assert_eq!(line.panel_name, "system");
        assert_eq!(line.kind, TagKind::Progress);
        let progress = line.progress_update.unwrap();
        assert_eq!(progress.current, 30.0);
        assert_eq!(progress.label, "update");
    }

    #[test]
    fn test_marker_digits_are_not_progress() {
        let line = TagParser::new().parse("[#task1]started").unwrap();
        assert!(line.progress_update.is_none());
    }

    #[test]
    fn test_line_ending_is_trimmed() {
        let line = TagParser::new().parse("[#a]hello\r\n").unwrap();
        assert_eq!(line.text, "hello");
    }

    #[test]
    fn test_classify_untagged() {
        let parsed = TagParser::new().classify("current/progress: 45%");
        assert_eq!(parsed.panel_name(), None);
        assert_eq!(parsed.text(), "current/progress: 45%");
        assert_eq!(parsed.progress_update().unwrap().current, 45.0);
    }

    #[test]
    fn test_classify_tagged() {
        let parsed = TagParser::new().classify("[#b]world");
        assert_eq!(parsed.panel_name(), Some("b"));
        assert_eq!(parsed.text(), "world");
        assert!(parsed.progress_update().is_none());
    }

    #[test]
    fn test_progress_extraction_can_be_disabled() {
        let parser = TagParser::new().with_progress_patterns(Vec::new());
        let line = parser.parse("[#a]50%").unwrap();
        assert!(line.progress_update.is_none());
    }

    #[test]
    fn test_marker_only_line() {
        let line = TagParser::new().parse("[#a]").unwrap();
        assert_eq!(line.panel_name, "a");
        assert_eq!(line.text, "");
    }
}
