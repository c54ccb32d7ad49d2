//! Component Module
//!
//! Region classification: tags arrive one at a time from the scanner and are
//! sorted into the template, script and style slots of a [`Component`].
//!
//! ## Invariants
//!
//! 1. At most one `<template>` and at most one `<script>` per document.
//! 2. Any number of `<style>` regions, kept in document order.
//! 3. Any other top-level tag is an error.
//!
//! These are checked as each tag arrives, not after the fact.

use std::collections::HashMap;

use crate::validate::{with_source_offset, CompileError};

pub const TEMPLATE_TAG: &str = "template";
pub const SCRIPT_TAG: &str = "script";
pub const STYLE_TAG: &str = "style";

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Attribute written without a value, e.g. `<style scoped>`.
    Flag,
    Value(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Flag => None,
            AttrValue::Value(v) => Some(v),
        }
    }

    /// Valueless attributes and non-empty values are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Flag => true,
            AttrValue::Value(v) => !v.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(HashMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(AttrValue::is_truthy)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// One top-level region of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub tag_name: String,
    pub contents: String,
    pub attribs: Attributes,
    /// Byte offset of the opening `<`.
    pub tag_start_index: usize,
    /// Byte offset of the first byte of `contents`.
    pub contents_start_index: usize,
}

impl Tag {
    pub fn new(tag_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Tag {
            tag_name: tag_name.into(),
            contents: contents.into(),
            attribs: Attributes::new(),
            tag_start_index: 0,
            contents_start_index: 0,
        }
    }

    pub fn at(mut self, tag_start_index: usize, contents_start_index: usize) -> Self {
        self.tag_start_index = tag_start_index;
        self.contents_start_index = contents_start_index;
        self
    }

    pub fn with_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.attribs.insert(name, value);
        self
    }

    pub fn with_flag(self, name: &str) -> Self {
        self.with_attr(name, AttrValue::Flag)
    }
}

/// A region whose contents are produced on demand and may fail to read.
///
/// Errors from [`RegionSource::read_contents`] carry offsets relative to the
/// start of the contents.
pub trait RegionSource {
    fn tag_name(&self) -> &str;
    fn attribs(&self) -> &Attributes;
    fn tag_start_index(&self) -> usize;
    fn contents_start_index(&self) -> usize;
    fn read_contents(&self) -> Result<String, CompileError>;
}

impl RegionSource for Tag {
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
        Ok(self.contents.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT
// ═══════════════════════════════════════════════════════════════════════════════

/// The classified regions of one document. Only [`ComponentBuilder`] creates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    template: Option<Tag>,
    script: Option<Tag>,
    styles: Vec<Tag>,
}

impl Component {
    pub fn template(&self) -> Option<&Tag> {
        self.template.as_ref()
    }

    pub fn script(&self) -> Option<&Tag> {
        self.script.as_ref()
    }

    pub fn styles(&self) -> &[Tag] {
        &self.styles
    }
}

/// Accumulation phase of compilation.
#[derive(Debug, Default)]
pub struct ComponentBuilder {
    component: Component,
}

impl ComponentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort one tag into its slot.
    pub fn classify(&mut self, tag: Tag) -> Result<(), CompileError> {
        log::trace!(
            "classifying <{}> at offset {}",
            tag.tag_name,
            tag.tag_start_index
        );

        match tag.tag_name.as_str() {
            TEMPLATE_TAG => Self::fill_slot(&mut self.component.template, tag),
            SCRIPT_TAG => Self::fill_slot(&mut self.component.script, tag),
            STYLE_TAG => {
                self.component.styles.push(tag);
                Ok(())
            }
            _ => Err(CompileError::UnrecognizedTag {
                offset: tag.tag_start_index,
                tag_name: tag.tag_name,
            }),
        }
    }

    /// Read a region's contents and classify it. Parse errors raised while
    /// reading are moved from region-relative to document offsets.
    pub fn add_region<R: RegionSource>(&mut self, region: &R) -> Result<(), CompileError> {
        let contents =
            with_source_offset(region.contents_start_index(), || region.read_contents()).map_err(
                |err| match err {
                    CompileError::RegionParse {
                        tag_name: None,
                        message,
                        offset,
                    } => CompileError::RegionParse {
                        tag_name: Some(region.tag_name().to_string()),
                        message,
                        offset,
                    },
                    other => other,
                },
            )?;

        self.classify(Tag {
            tag_name: region.tag_name().to_string(),
            contents,
            attribs: region.attribs().clone(),
            tag_start_index: region.tag_start_index(),
            contents_start_index: region.contents_start_index(),
        })
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn build(self) -> Component {
        self.component
    }

    fn fill_slot(slot: &mut Option<Tag>, tag: Tag) -> Result<(), CompileError> {
        if slot.is_some() {
            return Err(CompileError::DuplicateTag {
                offset: tag.tag_start_index,
                tag_name: tag.tag_name,
            });
        }
        *slot = Some(tag);
        Ok(())
    }
}
