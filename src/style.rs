//! Style processing: one engine call per `<style>` region.

use crate::component::Tag;
use crate::css::{MapOptions, StyleEngine, StyleOptions, StylePlugin};
use crate::finalize::StyleResult;
use crate::scoped_css::ScopedSelectorPlugin;
use crate::validate::CompileError;

/// Switches read from a `<style>` tag's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleFlags {
    /// `scoped` present and truthy.
    pub scoped: bool,
    /// `autoprefix` is anything but `"off"`. Vendor prefixing is currently
    /// disabled for load-time cost, so this switch changes nothing.
    pub autoprefix: bool,
    /// Requested preprocessor. Read but not acted on; CSS passes through.
    pub lang: Option<String>,
}

impl StyleFlags {
    pub fn from_tag(tag: &Tag) -> Self {
        StyleFlags {
            scoped: tag.attribs.is_truthy("scoped"),
            autoprefix: tag.attribs.value("autoprefix") != Some("off"),
            lang: tag.attribs.value("lang").map(str::to_string),
        }
    }
}

pub fn style_options(path: &str) -> StyleOptions {
    StyleOptions {
        from: Some(path.to_string()),
        to: Some(path.to_string()),
        map: Some(MapOptions {
            inline: false,
            annotation: false,
            prev: None,
        }),
    }
}

pub fn plugin_chain(flags: &StyleFlags, hash: &str) -> Vec<Box<dyn StylePlugin>> {
    let mut plugins: Vec<Box<dyn StylePlugin>> = Vec::new();

    if flags.scoped {
        plugins.push(Box::new(ScopedSelectorPlugin::new(hash)));
    }

    if flags.autoprefix {
        log::trace!("vendor prefixing is disabled; stylesheet left unprefixed");
    }

    plugins
}

/// Transform one style region.
pub fn process_style(
    tag: &Tag,
    hash: &str,
    path: &str,
    engine: &dyn StyleEngine,
) -> Result<StyleResult, CompileError> {
    let flags = StyleFlags::from_tag(tag);
    if let Some(lang) = &flags.lang {
        log::debug!("<style lang=\"{}\"> in {} is passed through as CSS", lang, path);
    }

    let plugins = plugin_chain(&flags, hash);
    let output = engine.process(&plugins, &tag.contents, &style_options(path))?;

    Ok(StyleResult {
        css: output.css,
        map: output.map,
    })
}
