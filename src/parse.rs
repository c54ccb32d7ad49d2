//! Parse Module for the Component Compiler
//!
//! Splits a raw component document into its top-level regions. Each region
//! records its attributes and offsets; the contents are read lazily so that a
//! malformed region surfaces its error through the classifier, which anchors
//! it to the document.

use lazy_static::lazy_static;
use regex::Regex;

use crate::component::{AttrValue, Attributes, RegionSource, SCRIPT_TAG, STYLE_TAG};
use crate::validate::CompileError;

lazy_static! {
    /// Opening tag of a top-level region, anchored at the scan position.
    static ref REGION_OPEN_RE: Regex = Regex::new(
        r#"^<([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*(/?)>"#
    )
    .unwrap();

    static ref SCRIPT_CLOSE_RE: Regex = Regex::new(r"(?i)</script\s*>").unwrap();
    static ref STYLE_CLOSE_RE: Regex = Regex::new(r"(?i)</style\s*>").unwrap();

    /// Comment opener, closing tag or opening tag inside a markup region.
    static ref MARKUP_BOUNDARY_RE: Regex = Regex::new(
        r"<!--|</([A-Za-z][A-Za-z0-9-]*)\s*>|<([A-Za-z][A-Za-z0-9-]*)(?:\s[^>]*)?>"
    )
    .unwrap();

    /// Attribute regex for region attributes
    static ref ATTR_REGEX: Regex = Regex::new(
        r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#
    )
    .unwrap();
}

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

// ═══════════════════════════════════════════════════════════════════════════════
// REGION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegionFault {
    message: String,
    /// Relative to the start of the contents.
    offset: usize,
}

/// A top-level region found by [`scan_regions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<'a> {
    tag_name: String,
    attribs: Attributes,
    tag_start_index: usize,
    contents_start_index: usize,
    body: Result<&'a str, RegionFault>,
}

impl RegionSource for Region<'_> {
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn attribs(&self) -> &Attributes {
        &self.attribs
    }

    fn tag_start_index(&self) -> usize {
        self.tag_start_index
    }

    fn contents_start_index(&self) -> usize {
        self.contents_start_index
    }

    fn read_contents(&self) -> Result<String, CompileError> {
        match &self.body {
            Ok(body) => Ok(body.to_string()),
            Err(fault) => Err(CompileError::RegionParse {
                tag_name: Some(self.tag_name.clone()),
                message: fault.message.clone(),
                offset: fault.offset,
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Split a document into top-level regions, in document order.
///
/// Whitespace and HTML comments between regions are skipped. Anything else
/// outside a region is an error at its absolute offset. A region without a
/// closing tag consumes the rest of the document and reports the problem
/// when its contents are read.
pub fn scan_regions(source: &str) -> Result<Vec<Region<'_>>, CompileError> {
    let mut regions = Vec::new();
    let mut pos = 0;

    loop {
        pos += leading_whitespace(&source[pos..]);
        if pos >= source.len() {
            break;
        }

        let rest = &source[pos..];
        if rest.starts_with(COMMENT_OPEN) {
            match rest.find(COMMENT_CLOSE) {
                Some(end) => {
                    pos += end + COMMENT_CLOSE.len();
                    continue;
                }
                None => {
                    return Err(CompileError::RegionParse {
                        tag_name: None,
                        message: "Unclosed HTML comment".to_string(),
                        offset: pos,
                    })
                }
            }
        }

        let Some(caps) = REGION_OPEN_RE.captures(rest) else {
            return Err(CompileError::RegionParse {
                tag_name: None,
                message: "Expected one of: <template>, <script>, <style>".to_string(),
                offset: pos,
            });
        };

        let tag_name = caps[1].to_ascii_lowercase();
        let attribs = parse_attributes(caps.get(2).map_or("", |m| m.as_str()));
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        let tag_start_index = pos;
        let contents_start_index = pos + caps[0].len();
        let body_src = &source[contents_start_index..];

        let (body, next) = if self_closing {
            (Ok(""), contents_start_index)
        } else {
            match find_region_end(body_src, &tag_name) {
                Ok((contents_end, close_end)) => (
                    Ok(&body_src[..contents_end]),
                    contents_start_index + close_end,
                ),
                Err(fault) => (Err(fault), source.len()),
            }
        };

        log::trace!(
            "found <{}> region at {}..{}",
            tag_name,
            tag_start_index,
            next
        );

        regions.push(Region {
            tag_name,
            attribs,
            tag_start_index,
            contents_start_index,
            body,
        });
        pos = next;
    }

    Ok(regions)
}

fn leading_whitespace(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// Parse the attribute list of an opening tag.
pub fn parse_attributes(attr_string: &str) -> Attributes {
    ATTR_REGEX
        .captures_iter(attr_string)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| AttrValue::Value(m.as_str().to_string()))
                .unwrap_or(AttrValue::Flag);
            Some((name, value))
        })
        .collect()
}

/// Locate the closing tag of a region. Returns the end of the contents and
/// the end of the closing tag, both relative to `body`.
fn find_region_end(body: &str, tag_name: &str) -> Result<(usize, usize), RegionFault> {
    let unclosed = || RegionFault {
        message: format!("Unclosed <{}>", tag_name),
        offset: body.len(),
    };

    // Raw-text regions end at the first closing tag, whatever precedes it.
    let raw_close = match tag_name {
        SCRIPT_TAG => Some(&*SCRIPT_CLOSE_RE),
        STYLE_TAG => Some(&*STYLE_CLOSE_RE),
        _ => None,
    };
    if let Some(close_re) = raw_close {
        return close_re
            .find(body)
            .map(|m| (m.start(), m.end()))
            .ok_or_else(unclosed);
    }

    let mut depth = 1usize;
    let mut pos = 0;
    while let Some(caps) = MARKUP_BOUNDARY_RE.captures_at(body, pos) {
        let Some(m) = caps.get(0) else { break };
        pos = m.end();

        if m.as_str() == COMMENT_OPEN {
            match body[m.end()..].find(COMMENT_CLOSE) {
                Some(end) => {
                    pos = m.end() + end + COMMENT_CLOSE.len();
                    continue;
                }
                None => {
                    return Err(RegionFault {
                        message: "Unclosed HTML comment".to_string(),
                        offset: m.start(),
                    })
                }
            }
        }

        if let Some(name) = caps.get(1) {
            if name.as_str().eq_ignore_ascii_case(tag_name) {
                depth -= 1;
                if depth == 0 {
                    return Ok((m.start(), m.end()));
                }
            }
        } else if let Some(name) = caps.get(2) {
            if name.as_str().eq_ignore_ascii_case(tag_name) && !m.as_str().ends_with("/>") {
                depth += 1;
            }
        }
    }

    Err(unclosed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes() {
        let attribs = parse_attributes(r#" scoped lang="scss" autoprefix='off' data-x=1"#);
        assert_eq!(attribs.get("scoped"), Some(&AttrValue::Flag));
        assert_eq!(attribs.value("lang"), Some("scss"));
        assert_eq!(attribs.value("autoprefix"), Some("off"));
        assert_eq!(attribs.value("data-x"), Some("1"));
        assert_eq!(attribs.len(), 4);
    }

    #[test]
    fn test_find_region_end_nested_template() {
        let body = "<template v-if=\"a\"><p/></template></template>rest";
        let (end, close_end) = find_region_end(body, "template").unwrap();
        assert_eq!(&body[..end], "<template v-if=\"a\"><p/></template>");
        assert_eq!(&body[close_end..], "rest");
    }

    #[test]
    fn test_find_region_end_skips_comments() {
        let body = "<!-- </template> --><p></p></template>";
        let (end, _) = find_region_end(body, "template").unwrap();
        assert_eq!(&body[..end], "<!-- </template> --><p></p>");
    }

    #[test]
    fn test_find_region_end_raw_text() {
        let body = "if (a < b) { x('<style>') }</SCRIPT >";
        let (end, close_end) = find_region_end(body, "script").unwrap();
        assert_eq!(end, body.find("</SCRIPT").unwrap());
        assert_eq!(close_end, body.len());
    }

    #[test]
    fn test_find_region_end_unclosed_comment() {
        let body = "<p>a</p><!-- never closed";
        let fault = find_region_end(body, "template").unwrap_err();
        assert_eq!(fault.offset, 8);
    }

    #[test]
    fn test_find_region_end_other_tags_nest_by_name() {
        let body = "<Foo a=\"1\"></FOO><bar></foo>tail";
        let (end, close_end) = find_region_end(body, "foo").unwrap();
        assert_eq!(&body[..end], "<Foo a=\"1\"></FOO><bar>");
        assert_eq!(&body[close_end..], "tail");
    }

    #[test]
    fn test_find_region_end_unclosed_markup() {
        let fault = find_region_end("<p>a", "template").unwrap_err();
        assert_eq!(fault.message, "Unclosed <template>");
        assert_eq!(fault.offset, 4);
    }

    #[test]
    fn test_self_closing_region() {
        let regions = scan_regions("<template/>").unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].read_contents().unwrap(), "");
    }
}
