//! Synopsis extraction and per-directory selection.

/// Comments whose first sentence starts with one of these are not synopses.
const ILLEGAL_PREFIXES: [&str; 3] = ["copyright", "all rights", "author"];

/// Priority of a synopsis candidate; lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Package name matches the directory name.
    MatchesDir = 0,
    /// A `main` package.
    Main = 1,
    /// Anything else.
    Other = 2,
}

impl Priority {
    /// Rank a package declared as `package_name` inside `dir_name`.
    pub fn classify(package_name: &str, dir_name: &str) -> Self {
        if package_name == dir_name {
            Self::MatchesDir
        } else if package_name == "main" {
            Self::Main
        } else {
            Self::Other
        }
    }
}

/// Keeps the first synopsis offered at each priority.
#[derive(Debug, Clone, Default)]
pub struct SynopsisSelector {
    slots: [String; 3],
}

impl SynopsisSelector {
    /// A selector with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer doc comment text at `priority`; ignored if the slot is taken.
    pub fn offer(&mut self, priority: Priority, doc: &str) {
        let slot = &mut self.slots[priority as usize];
        if slot.is_empty() {
            *slot = synopsis(doc);
        }
    }

    /// Store an already-computed synopsis at top priority.
    pub fn set_primary(&mut self, synopsis: impl Into<String>) {
        self.slots[Priority::MatchesDir as usize] = synopsis.into();
    }

    /// True once the top-priority slot holds a synopsis.
    pub fn has_primary(&self) -> bool {
        !self.slots[Priority::MatchesDir as usize].is_empty()
    }

    /// The highest-priority non-empty synopsis, or an empty string.
    pub fn select(self) -> String {
        self.slots
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }
}

/// Extract the text of a comment group.
///
/// Markers are removed, `//`-style compiler directives dropped, trailing
/// whitespace trimmed, leading blank lines removed and interior runs of
/// blank lines collapsed. Non-empty results end in a newline.
pub fn comment_text<'a>(comments: impl IntoIterator<Item = &'a str>) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for comment in comments {
        let body = if let Some(body) = comment.strip_prefix("//") {
            if let Some(body) = body.strip_prefix(' ') {
                body
            } else if is_directive(body) {
                continue;
            } else {
                body
            }
        } else {
            comment
                .strip_prefix("/*")
                .and_then(|c| c.strip_suffix("*/"))
                .unwrap_or(comment)
        };
        lines.extend(body.split('\n').map(str::trim_end));
    }

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        if !line.is_empty() || kept.last().is_some_and(|l| !l.is_empty()) {
            kept.push(line);
        }
    }
    if kept.last().is_some_and(|l| !l.is_empty()) {
        kept.push("");
    }
    kept.join("\n")
}

/// Whether a `//` comment body is a tool directive such as `go:generate`.
fn is_directive(body: &str) -> bool {
    if ["line ", "extern ", "export "]
        .iter()
        .any(|p| body.starts_with(p))
    {
        return true;
    }
    let Some(colon) = body.find(':') else {
        return false;
    };
    let (tool, rest) = body.split_at(colon);
    !tool.is_empty()
        && tool
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && rest
            .as_bytes()
            .get(1)
            .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Byte length of the first sentence of `s`.
///
/// A sentence ends at a period followed by whitespace, unless the period
/// follows a single uppercase letter, or after an ideographic full stop.
fn first_sentence_len(s: &str) -> usize {
    let (mut ppp, mut pp, mut p) = ('\0', '\0', '\0');
    for (i, q) in s.char_indices() {
        let q = if matches!(q, '\n' | '\r' | '\t') { ' ' } else { q };
        if q == ' ' && p == '.' && (!pp.is_uppercase() || ppp.is_uppercase()) {
            return i;
        }
        if p == '。' || p == '．' {
            return i;
        }
        (ppp, pp, p) = (pp, p, q);
    }
    s.len()
}

/// First sentence of `doc` on one line, or empty if it is a legal notice.
pub fn synopsis(doc: &str) -> String {
    let sentence = &doc[..first_sentence_len(doc)];
    let line = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = line.to_lowercase();
    if ILLEGAL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return String::new();
    }
    line.replace("``", "\u{201c}").replace("''", "\u{201d}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synopsis_first_sentence() {
        assert_eq!(synopsis("Package a does things. And more."), "Package a does things.");
        assert_eq!(synopsis("Package a\ndoes things.\nSecond."), "Package a does things.");
        assert_eq!(synopsis("No period here"), "No period here");
        assert_eq!(synopsis("Uses e.g. tricks. Yes."), "Uses e.g.");
    }

    #[test]
    fn test_synopsis_keeps_initials() {
        assert_eq!(
            synopsis("Written by J. Smith for the U.S. team. Done."),
            "Written by J. Smith for the U.S. team."
        );
        assert_eq!(synopsis("包提供了工具。更多"), "包提供了工具。");
    }

    #[test]
    fn test_synopsis_rejects_legal_notices() {
        assert_eq!(synopsis("Copyright 2020 The Authors. All rights reserved."), "");
        assert_eq!(synopsis("AUTHOR: someone"), "");
        assert_eq!(synopsis("Authentic parser."), "Authentic parser.");
    }

    #[test]
    fn test_synopsis_quotes() {
        assert_eq!(synopsis("Say ``hi''."), "Say \u{201c}hi\u{201d}.");
    }

    #[test]
    fn test_comment_text() {
        let text = comment_text(["// Line one.", "//", "//", "//   indented", "//go:generate stringer"]);
        assert_eq!(text, "Line one.\n\n  indented\n");

        assert_eq!(comment_text(["/* one */"]), " one\n");
        assert_eq!(comment_text(["//", "//"]), "");
        assert_eq!(comment_text(["//line foo.go:1"]), "");
    }

    #[test]
    fn test_is_directive() {
        assert!(is_directive("go:generate x"));
        assert!(is_directive("line foo.go:3"));
        assert!(!is_directive(" go:generate"));
        assert!(!is_directive("Note: x"));
        assert!(!is_directive("go:"));
        assert!(is_directive("lint:1x"));
        assert!(!is_directive("lint: 1x"));
    }

    #[test]
    fn test_priority() {
        assert_eq!(Priority::classify("foo", "foo"), Priority::MatchesDir);
        assert_eq!(Priority::classify("main", "foo"), Priority::Main);
        assert_eq!(Priority::classify("bar", "foo"), Priority::Other);
        assert_eq!(Priority::classify("main", "main"), Priority::MatchesDir);
    }

    #[test]
    fn test_selector_prefers_lowest_priority() {
        let mut selector = SynopsisSelector::new();
        selector.offer(Priority::Other, "C.");
        selector.offer(Priority::Main, "B.");
        assert!(!selector.has_primary());
        selector.offer(Priority::MatchesDir, "A.");
        assert!(selector.has_primary());
        selector.offer(Priority::MatchesDir, "Later.");
        assert_eq!(selector.select(), "A.");
    }

    #[test]
    fn test_selector_empty_slot_can_be_refilled() {
        let mut selector = SynopsisSelector::new();
        selector.offer(Priority::Main, "Copyright 2020.");
        selector.offer(Priority::Main, "Command vet checks code.");
        assert_eq!(selector.select(), "Command vet checks code.");
        assert_eq!(SynopsisSelector::new().select(), "");
    }
}
