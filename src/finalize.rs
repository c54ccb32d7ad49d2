//! Finalize Module for the component compiler
//!
//! The finalize phase: takes a fully classified [`Component`] and produces the
//! build artifacts. Runs template scoping, script assembly and style
//! processing in that order and aggregates their output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codegen::{assemble_script, ScriptAssembly};
use crate::component::Component;
use crate::config::{CompileOptions, FileMeta};
use crate::css::StyleEngine;
use crate::scope::scope_template;
use crate::style::process_style;
use crate::transform::ScriptEngine;
use crate::validate::CompileError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleResult {
    pub css: String,
    pub map: Option<Value>,
}

/// Output of compiling one document. `map` covers the script only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub code: String,
    pub map: Option<Value>,
    pub styles: Vec<StyleResult>,
}

/// The engines a compilation delegates to.
#[derive(Clone, Copy)]
pub struct Engines<'e> {
    pub script: &'e dyn ScriptEngine,
    pub style: &'e dyn StyleEngine,
}

/// Everything the finalize phase reads besides the component itself.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub meta: &'a FileMeta,
    pub options: &'a CompileOptions,
    pub engines: Engines<'a>,
}

pub fn assemble(script: ScriptAssembly, styles: Vec<StyleResult>) -> CompileResult {
    CompileResult {
        code: script.code,
        map: script.map,
        styles,
    }
}

/// Compile a classified component. Stops at the first error.
pub fn compile(component: &Component, ctx: &CompileContext<'_>) -> Result<CompileResult, CompileError> {
    let hash = ctx.meta.scope_hash();
    log::debug!("finalizing {} with scope hash {}", ctx.meta.path, hash);

    let template_literal = component
        .template()
        .map(|tag| scope_template(&tag.contents, &hash));

    let script = assemble_script(
        component.script(),
        template_literal.as_deref(),
        &ctx.options.script,
        ctx.meta,
        ctx.engines.script,
    )?;

    let styles = component
        .styles()
        .iter()
        .map(|tag| process_style(tag, &hash, &ctx.meta.path, ctx.engines.style))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(assemble(script, styles))
}
