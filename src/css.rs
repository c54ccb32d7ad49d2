//! Stylesheet transform engine.
//!
//! A [`StyleEngine`] runs a chain of [`StylePlugin`]s over one style region
//! and prints the result with a source map. [`LightningCssEngine`] is the
//! native implementation.

use lightningcss::error::{Error, ParserError};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use parcel_sourcemap::SourceMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::{SourceLocation, TransformError};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS & OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// Embed the map in the CSS instead of returning it separately.
    pub inline: bool,
    /// Append a `sourceMappingURL` comment.
    pub annotation: bool,
    /// Map of an earlier transform of the same style, if any.
    pub prev: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    /// `None` disables source maps.
    pub map: Option<MapOptions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleOutput {
    pub css: String,
    pub map: Option<Value>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAITS
// ═══════════════════════════════════════════════════════════════════════════════

/// One step of a stylesheet transform chain.
pub trait StylePlugin: Send + Sync {
    fn name(&self) -> &str;
    fn transform(&self, css: &str) -> Result<String, TransformError>;
}

pub trait StyleEngine: Send + Sync {
    fn process(
        &self,
        plugins: &[Box<dyn StylePlugin>],
        css: &str,
        options: &StyleOptions,
    ) -> Result<StyleOutput, TransformError>;
}

/// Feed `css` through every plugin in order.
pub fn run_plugins(plugins: &[Box<dyn StylePlugin>], css: &str) -> Result<String, TransformError> {
    let mut current = css.to_string();
    for plugin in plugins {
        log::trace!("running style plugin {}", plugin.name());
        current = plugin.transform(&current)?;
    }
    Ok(current)
}

/// Convert a lightningcss parse failure, keeping its 1-based position in the
/// parsed text.
pub(crate) fn parse_error(err: Error<ParserError<'_>>) -> TransformError {
    let location = err.loc.as_ref().map(|loc| SourceLocation {
        line: loc.line + 1,
        column: loc.column,
    });
    TransformError::style(err.kind.to_string()).with_location(location)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIGHTNINGCSS ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Stylesheet engine backed by lightningcss.
///
/// `map.prev` is accepted but not composed into the output map, and
/// `map.inline`/`map.annotation` are not supported: the map is always
/// returned separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningCssEngine {
    pub minify: bool,
}

impl LightningCssEngine {
    pub const fn new() -> Self {
        LightningCssEngine { minify: false }
    }
}

impl StyleEngine for LightningCssEngine {
    fn process(
        &self,
        plugins: &[Box<dyn StylePlugin>],
        css: &str,
        options: &StyleOptions,
    ) -> Result<StyleOutput, TransformError> {
        let css = run_plugins(plugins, css)?;
        let filename = options.from.clone().unwrap_or_default();

        let stylesheet = StyleSheet::parse(
            &css,
            ParserOptions {
                filename: filename.clone(),
                ..ParserOptions::default()
            },
        )
        .map_err(parse_error)?;

        let mut source_map = if options.map.is_some() {
            let mut map = SourceMap::new("/");
            let index = map.add_source(&filename);
            map.set_source_content(index as usize, &css)
                .map_err(|err| TransformError::style(format!("{:?}", err)))?;
            Some(map)
        } else {
            None
        };

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: self.minify,
                source_map: source_map.as_mut(),
                ..PrinterOptions::default()
            })
            .map_err(|err| TransformError::style(err.to_string()))?;

        let map = match source_map.as_mut() {
            Some(map) => {
                let json = map
                    .to_json(None)
                    .map_err(|err| TransformError::style(format!("{:?}", err)))?;
                Some(
                    serde_json::from_str(&json)
                        .map_err(|err| TransformError::style(err.to_string()))?,
                )
            }
            None => None,
        };

        log::debug!(
            "lightningcss processed {} with {} plugin(s)",
            filename,
            plugins.len()
        );

        Ok(StyleOutput {
            css: printed.code,
            map,
        })
    }
}
