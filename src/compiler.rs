//! Host-facing entry points.
//!
//! [`ComponentCompiler`] is what a build plugin drives: one instance per
//! document, fed tags during scanning, then asked for results once.

use crate::component::{Component, ComponentBuilder, RegionSource, Tag};
use crate::config::{CompileOptions, FileMeta};
use crate::css::LightningCssEngine;
use crate::finalize::{compile, CompileContext, CompileResult, Engines};
use crate::parse::scan_regions;
use crate::transform::OxcScriptEngine;
use crate::validate::{CompileError, ErrorSink};

static NATIVE_SCRIPT_ENGINE: OxcScriptEngine = OxcScriptEngine;
static NATIVE_STYLE_ENGINE: LightningCssEngine = LightningCssEngine::new();

impl Engines<'static> {
    /// oxc for scripts, lightningcss for styles.
    pub fn native() -> Self {
        Engines {
            script: &NATIVE_SCRIPT_ENGINE,
            style: &NATIVE_STYLE_ENGINE,
        }
    }
}

pub struct ComponentCompiler<'e> {
    meta: FileMeta,
    options: CompileOptions,
    engines: Engines<'e>,
    builder: ComponentBuilder,
}

impl<'e> ComponentCompiler<'e> {
    pub fn new(meta: FileMeta, options: CompileOptions, engines: Engines<'e>) -> Self {
        ComponentCompiler {
            meta,
            options,
            engines,
            builder: ComponentBuilder::new(),
        }
    }

    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    pub fn add_tag(&mut self, tag: Tag) -> Result<(), CompileError> {
        self.builder.classify(tag)
    }

    pub fn add_region<R: RegionSource>(&mut self, region: &R) -> Result<(), CompileError> {
        self.builder.add_region(region)
    }

    pub fn component(&self) -> &Component {
        self.builder.component()
    }

    /// Run the finalize phase. Every call re-runs the engines.
    pub fn get_results(&self) -> Result<CompileResult, CompileError> {
        let ctx = CompileContext {
            meta: &self.meta,
            options: &self.options,
            engines: self.engines,
        };
        compile(self.builder.component(), &ctx)
    }
}

/// Scan, classify and compile a whole document.
pub fn compile_source(
    source: &str,
    meta: &FileMeta,
    options: &CompileOptions,
    engines: Engines<'_>,
) -> Result<CompileResult, CompileError> {
    let mut compiler = ComponentCompiler::new(meta.clone(), options.clone(), engines);
    for region in scan_regions(source)? {
        compiler.add_region(&region)?;
    }
    compiler.get_results()
}

/// [`compile_source`], reporting a failure to `sink` instead of returning it.
pub fn compile_document(
    source: &str,
    meta: &FileMeta,
    options: &CompileOptions,
    engines: Engines<'_>,
    sink: &mut dyn ErrorSink,
) -> Option<CompileResult> {
    match compile_source(source, meta, options, engines) {
        Ok(result) => Some(result),
        Err(err) => {
            log::debug!("compilation of {} failed: {}", meta.path, err);
            err.report_to(sink);
            None
        }
    }
}
