//! # Single-File Component Compiler
//!
//! Compiles a component document (one optional `<template>`, one optional
//! `<script>`, any number of `<style>` regions) into a script module, a render
//! template string embedded in it, and a list of processed stylesheets.
//!
//! ## Pipeline
//!
//! 1. **Scan**: [`parse::scan_regions`] splits the document into top-level regions.
//! 2. **Classify**: [`ComponentBuilder`] sorts regions into slots, rejecting
//!    duplicate `<template>`/`<script>` regions and unknown tags as they arrive.
//! 3. **Finalize**: [`compile`] scopes the template, assembles the script
//!    module and processes each style, then returns one [`CompileResult`].
//!
//! ## Scope Hash
//!
//! `"__v" + content hash` is added as an attribute to every opening tag of the
//! template and, for `<style scoped>`, as an attribute selector to every rule.
//! The same value on both sides is what binds a stylesheet to the markup of
//! exactly one component.
//!
//! ## Errors
//!
//! Every failure is fatal for the document. Structural errors carry absolute
//! offsets into the document; engine errors keep the positions the engine
//! reported, relative to the region it was given.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod codegen;
mod compiler;
mod component;
mod config;
mod css;
mod discovery;
mod finalize;
pub mod parse;
mod scope;
mod scoped_css;
mod style;
mod transform;
mod validate;

#[cfg(test)]
mod component_tests;
#[cfg(test)]
mod test_support;

pub use codegen::{assemble_script, rewrite_default_export, ScriptAssembly};
pub use compiler::{compile_document, compile_source, ComponentCompiler};
pub use component::{
    AttrValue, Attributes, Component, ComponentBuilder, RegionSource, Tag, SCRIPT_TAG, STYLE_TAG,
    TEMPLATE_TAG,
};
pub use config::{compute_hash, CompileOptions, FileMeta, SCOPE_HASH_PREFIX};
pub use css::{
    run_plugins, LightningCssEngine, MapOptions, StyleEngine, StyleOptions, StyleOutput,
    StylePlugin,
};
pub use discovery::{
    compile_batch, compile_directory, find_component_files, BatchEntry, BatchError,
};
pub use finalize::{assemble, compile, CompileContext, CompileResult, Engines, StyleResult};
pub use scope::scope_template;
pub use scoped_css::{scope_selectors, ScopedSelectorPlugin};
pub use style::{plugin_chain, process_style, StyleFlags};
pub use transform::{OxcScriptEngine, ScriptEngine, ScriptOptions, ScriptOutput};
pub use validate::*;

/// Compile one document for a Node host. Errors are thrown with the
/// serialized [`CompilerDiagnostic`] as their reason.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_component_native(
    source: String,
    path: String,
    package_name: Option<String>,
    options_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let options = match options_json {
        Some(json) => CompileOptions::from_json(&json)
            .map_err(|e| napi::Error::from_reason(format!("Invalid compile options: {}", e)))?,
        None => CompileOptions::default(),
    };
    let meta = FileMeta::from_source(path, package_name, &source);

    let result = compile_source(&source, &meta, &options, Engines::native()).map_err(|err| {
        let diagnostic = err.to_diagnostic(&source, &meta.path);
        napi::Error::from_reason(
            serde_json::to_string(&diagnostic).unwrap_or_else(|_| err.to_string()),
        )
    })?;

    serde_json::to_value(result).map_err(|e| napi::Error::from_reason(e.to_string()))
}
