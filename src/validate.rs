//! Validation Module for the Component Compiler
//!
//! Error taxonomy shared by every compilation phase, stable diagnostic codes,
//! the host-facing error sink and the source-offset re-anchoring combinator.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_DUPLICATE_TAG: &str = "V-ERR-DUPLICATE-TAG";
pub const ERR_UNRECOGNIZED_TAG: &str = "V-ERR-UNRECOGNIZED-TAG";
pub const ERR_REGION_PARSE: &str = "V-ERR-REGION-PARSE";
pub const ERR_SCRIPT_TRANSFORM: &str = "V-ERR-SCRIPT-TRANSFORM";
pub const ERR_STYLE_TRANSFORM: &str = "V-ERR-STYLE-TRANSFORM";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_DUPLICATE_TAG => "A component file holds at most one <template> and one <script>.",
        ERR_UNRECOGNIZED_TAG => {
            "Only <template>, <script> and <style> regions appear at the top level."
        }
        ERR_REGION_PARSE => "Every region is closed and positions refer to the whole document.",
        ERR_SCRIPT_TRANSFORM => "The script region is valid input for the script engine.",
        ERR_STYLE_TRANSFORM => "Every style region is valid input for the stylesheet engine.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE LOCATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// 1-based line and column of a byte offset. Offsets past the end clamp to
    /// the end of the document.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut end = offset.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let before = &source[..end];
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() as u32 + 1;
        SourceLocation { line, column }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformStage {
    Script,
    Style,
}

/// Failure reported by a script or stylesheet engine.
///
/// Positions are in the coordinate space of the region the engine was given,
/// never re-anchored to the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransformError {
    pub stage: TransformStage,
    pub message: String,
    pub offset: Option<usize>,
    pub location: Option<SourceLocation>,
}

impl TransformError {
    pub fn script(message: impl Into<String>) -> Self {
        Self::new(TransformStage::Script, message)
    }

    pub fn style(message: impl Into<String>) -> Self {
        Self::new(TransformStage::Style, message)
    }

    fn new(stage: TransformStage, message: impl Into<String>) -> Self {
        TransformError {
            stage,
            message: message.into(),
            offset: None,
            location: None,
        }
    }

    pub fn with_offset(mut self, offset: Option<usize>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Every way compiling one document can fail. All variants are fatal for the
/// document; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Only one <{tag_name}> allowed in component file")]
    DuplicateTag { tag_name: String, offset: usize },

    #[error("Expected <template>, <script>, or <style> tag in template file")]
    UnrecognizedTag { tag_name: String, offset: usize },

    /// `offset` is relative to the region contents until it passes through
    /// [`with_source_offset`], absolute afterwards.
    #[error("{message}")]
    RegionParse {
        tag_name: Option<String>,
        message: String,
        offset: usize,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::DuplicateTag { .. } => ERR_DUPLICATE_TAG,
            CompileError::UnrecognizedTag { .. } => ERR_UNRECOGNIZED_TAG,
            CompileError::RegionParse { .. } => ERR_REGION_PARSE,
            CompileError::Transform(err) => match err.stage {
                TransformStage::Script => ERR_SCRIPT_TRANSFORM,
                TransformStage::Style => ERR_STYLE_TRANSFORM,
            },
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            CompileError::DuplicateTag { tag_name, .. }
            | CompileError::UnrecognizedTag { tag_name, .. } => Some(tag_name),
            CompileError::RegionParse { tag_name, .. } => tag_name.as_deref(),
            CompileError::Transform(err) => Some(match err.stage {
                TransformStage::Script => "script",
                TransformStage::Style => "style",
            }),
        }
    }

    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::DuplicateTag { offset, .. }
            | CompileError::UnrecognizedTag { offset, .. }
            | CompileError::RegionParse { offset, .. } => Some(*offset),
            CompileError::Transform(err) => err.offset,
        }
    }

    /// Hand the error to the host's reporter.
    pub fn report_to(&self, sink: &mut dyn ErrorSink) {
        sink.report(self.tag_name(), &self.to_string(), self.offset());
    }

    pub fn to_diagnostic(&self, source: &str, file: &str) -> CompilerDiagnostic {
        let location = match self {
            CompileError::Transform(TransformError {
                location: Some(location),
                ..
            }) => *location,
            // Transform offsets are region-relative, so line/column of the
            // document would be misleading.
            CompileError::Transform(_) => SourceLocation::default(),
            _ => self
                .offset()
                .map(|offset| SourceLocation::from_offset(source, offset))
                .unwrap_or_default(),
        };
        let code = self.code();

        CompilerDiagnostic {
            code: code.to_string(),
            message: self.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            offset: self.offset().map(|o| o as u32),
            line: location.line,
            column: location.column,
        }
    }
}

/// Serializable form of a [`CompileError`] for the host bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CompilerDiagnostic {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub offset: Option<u32>,
    pub line: u32,
    pub column: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// OFFSET RE-ANCHORING
// ═══════════════════════════════════════════════════════════════════════════════

/// Run `f` and shift the offset of any [`CompileError::RegionParse`] it returns
/// by `base`. Every other error passes through untouched.
pub fn with_source_offset<T>(
    base: usize,
    f: impl FnOnce() -> Result<T, CompileError>,
) -> Result<T, CompileError> {
    f().map_err(|err| match err {
        CompileError::RegionParse {
            tag_name,
            message,
            offset,
        } => CompileError::RegionParse {
            tag_name,
            message,
            offset: base + offset,
        },
        other => other,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Host-provided reporter for compile errors.
pub trait ErrorSink {
    fn report(&mut self, tag_name: Option<&str>, message: &str, offset: Option<usize>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub tag_name: Option<String>,
    pub message: String,
    pub offset: Option<usize>,
}

/// Sink that keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub reports: Vec<ReportedError>,
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, tag_name: Option<&str>, message: &str, offset: Option<usize>) {
        self.reports.push(ReportedError {
            tag_name: tag_name.map(str::to_string),
            message: message.to_string(),
            offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_error(offset: usize) -> CompileError {
        CompileError::RegionParse {
            tag_name: Some("template".to_string()),
            message: "Unclosed comment".to_string(),
            offset,
        }
    }

    #[test]
    fn test_with_source_offset_reanchors_region_errors() {
        let result: Result<(), _> = with_source_offset(40, || Err(region_error(3)));
        assert_eq!(result.unwrap_err().offset(), Some(43));
    }

    #[test]
    fn test_with_source_offset_leaves_other_errors() {
        let result: Result<(), _> = with_source_offset(40, || {
            Err(CompileError::DuplicateTag {
                tag_name: "script".to_string(),
                offset: 7,
            })
        });
        assert_eq!(result.unwrap_err().offset(), Some(7));

        let result: Result<(), _> = with_source_offset(40, || {
            Err(TransformError::script("Unexpected token").with_offset(Some(2)).into())
        });
        assert_eq!(result.unwrap_err().offset(), Some(2));
    }

    #[test]
    fn test_with_source_offset_passes_values() {
        assert_eq!(with_source_offset(10, || Ok(5)).unwrap(), 5);
    }

    #[test]
    fn test_error_messages() {
        let dup = CompileError::DuplicateTag {
            tag_name: "template".to_string(),
            offset: 0,
        };
        assert_eq!(dup.to_string(), "Only one <template> allowed in component file");

        let unknown = CompileError::UnrecognizedTag {
            tag_name: "foo".to_string(),
            offset: 0,
        };
        assert!(unknown.to_string().contains("<template>, <script>, or <style>"));
        assert_eq!(unknown.code(), ERR_UNRECOGNIZED_TAG);
    }

    #[test]
    fn test_location_from_offset() {
        let source = "<template>\n  <p>\n</template>";
        assert_eq!(
            SourceLocation::from_offset(source, 0),
            SourceLocation { line: 1, column: 1 }
        );
        assert_eq!(
            SourceLocation::from_offset(source, 13),
            SourceLocation { line: 2, column: 3 }
        );
        assert_eq!(SourceLocation::from_offset(source, 999).line, 3);
    }

    #[test]
    fn test_diagnostic_for_region_error() {
        let source = "<template>\n<!-- oops\n</template>";
        let diagnostic = region_error(11).to_diagnostic(source, "/app/a.vue");
        assert_eq!(diagnostic.code, ERR_REGION_PARSE);
        assert_eq!(diagnostic.line, 2);
        assert_eq!(diagnostic.column, 1);
        assert_eq!(diagnostic.offset, Some(11));
        assert_eq!(diagnostic.file, "/app/a.vue");
    }

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::default();
        region_error(4).report_to(&mut sink);
        assert_eq!(
            sink.reports,
            vec![ReportedError {
                tag_name: Some("template".to_string()),
                message: "Unclosed comment".to_string(),
                offset: Some(4),
            }]
        );
    }
}
