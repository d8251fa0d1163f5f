//! Package clause parser.
//!
//! Reads only as far as the `package` clause of a Go source file and
//! reports the declared package name together with its doc comment.

use pkgtree_core::BuildError;

use crate::synopsis::comment_text;

/// Declared package name and the comment attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    /// Package name from the `package` clause.
    pub name: String,
    /// Doc comment text, markers removed.
    pub doc: Option<String>,
}

/// A raw comment with its line span.
struct Comment<'a> {
    text: &'a str,
    end_line: usize,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let taken = &self.src[self.pos..self.pos + len];
        self.line += taken.matches('\n').count();
        self.pos += len;
        taken
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start_matches([' ', '\t', '\r', '\n']).len();
        self.advance(len);
    }

    /// Consume one comment at the cursor, if any.
    fn comment(&mut self) -> Result<Option<Comment<'a>>, BuildError> {
        let rest = self.rest();
        let len = if rest.starts_with("//") {
            rest.find('\n').unwrap_or(rest.len())
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => end + 4,
                None => return Err(error(self.line, "comment not terminated")),
            }
        } else {
            return Ok(None);
        };
        let text = self.advance(len);
        Ok(Some(Comment {
            text,
            end_line: self.line,
        }))
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let first = rest.chars().next()?;
        if !(first.is_alphabetic() || first == '_') {
            return None;
        }
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        Some(self.advance(len))
    }
}

fn error(line: usize, message: impl Into<String>) -> BuildError {
    BuildError::Parse {
        path: String::new(),
        line,
        message: message.into(),
    }
}

/// Parse the package clause and its doc comment from Go source.
///
/// Comments on adjacent lines form a group; the doc comment is the last
/// group ending on the line right before the `package` keyword. The
/// returned error carries no path; callers add it with
/// [`BuildError::with_path`].
pub fn parse_package_clause(src: &[u8]) -> Result<PackageClause, BuildError> {
    let text = String::from_utf8_lossy(src);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut cursor = Cursor {
        src: text,
        pos: 0,
        line: 1,
    };

    let mut group: Vec<Comment<'_>> = Vec::new();
    loop {
        cursor.skip_whitespace();
        let start_line = cursor.line;
        let Some(comment) = cursor.comment()? else {
            break;
        };
        let adjacent = group.last().is_some_and(|c| start_line <= c.end_line + 1);
        if !adjacent {
            group.clear();
        }
        group.push(comment);
    }

    let keyword_line = cursor.line;
    match cursor.identifier() {
        Some("package") => {}
        Some(other) => {
            return Err(error(keyword_line, format!("expected 'package', found '{other}'")));
        }
        None => return Err(error(keyword_line, "expected 'package'")),
    }

    // Comments between the keyword and the name are legal but not docs.
    loop {
        cursor.skip_whitespace();
        if cursor.comment()?.is_none() {
            break;
        }
    }
    let name = cursor
        .identifier()
        .ok_or_else(|| error(cursor.line, "expected package name"))?;

    let is_lead = group.last().is_some_and(|c| c.end_line + 1 == keyword_line);
    let doc = is_lead
        .then(|| comment_text(group.iter().map(|c| c.text)))
        .filter(|doc| !doc.is_empty());

    Ok(PackageClause {
        name: name.to_string(),
        doc,
    })
}
