//! Template scoping.
//!
//! Every opening tag of the template receives the document's scope hash as a
//! valueless attribute, then the text is flattened into a body that can sit
//! between single quotes in generated code.
//!
//! This is a textual pass, not a markup parser. Malformed markup goes through
//! rewritten but still malformed; validating the template is a non-goal.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// A tag name right after `<`, optional attributes on the same line,
    /// optional self-closing slash.
    static ref OPEN_TAG_RE: Regex = Regex::new(r"<([A-Za-z0-9_-]+)(\s+.*?)?/?>").unwrap();
    static ref LINE_BREAK_RE: Regex = Regex::new(r"\r\n|\n|\r").unwrap();
}

/// Add `hash` to every opening tag and serialize the template as the body of
/// a single-quoted, single-line string literal.
pub fn scope_template(template: &str, hash: &str) -> String {
    let tagged = OPEN_TAG_RE.replace_all(template, |caps: &Captures| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let start = caps.get(0).map_or(0, |m| m.start());
        // Insert after the attributes if there are any, else after the name.
        let insert_at = caps
            .get(2)
            .or_else(|| caps.get(1))
            .map_or(whole.len(), |m| m.end() - start);
        format!("{} {}{}", &whole[..insert_at], hash, &whole[insert_at..])
    });

    let escaped = tagged.replace('\'', "\\'");
    LINE_BREAK_RE.replace_all(&escaped, "").into_owned()
}
