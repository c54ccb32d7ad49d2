//! In-memory engines for exercising the pipeline without oxc or lightningcss.

use serde_json::json;
use std::sync::Mutex;

use crate::css::{run_plugins, StyleEngine, StyleOptions, StyleOutput, StylePlugin};
use crate::finalize::Engines;
use crate::transform::{ScriptEngine, ScriptOptions, ScriptOutput};
use crate::validate::TransformError;

/// Returns the script unchanged and remembers every call.
#[derive(Default)]
pub struct RecordingScriptEngine {
    calls: Mutex<Vec<(String, ScriptOptions)>>,
}

impl RecordingScriptEngine {
    pub fn calls(&self) -> Vec<(String, ScriptOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScriptEngine for RecordingScriptEngine {
    fn compile(
        &self,
        source: &str,
        options: &ScriptOptions,
    ) -> Result<ScriptOutput, TransformError> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_string(), options.clone()));
        Ok(ScriptOutput {
            code: source.to_string(),
            map: Some(json!({
                "version": 3,
                "file": options.source_map_target,
                "sources": [options.source_file_name],
                "mappings": ""
            })),
        })
    }
}

pub struct FailingScriptEngine(pub TransformError);

impl ScriptEngine for FailingScriptEngine {
    fn compile(&self, _: &str, _: &ScriptOptions) -> Result<ScriptOutput, TransformError> {
        Err(self.0.clone())
    }
}

/// Runs the plugin chain and nothing else, remembering plugin names per call.
#[derive(Default)]
pub struct RecordingStyleEngine {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingStyleEngine {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl StyleEngine for RecordingStyleEngine {
    fn process(
        &self,
        plugins: &[Box<dyn StylePlugin>],
        css: &str,
        _options: &StyleOptions,
    ) -> Result<StyleOutput, TransformError> {
        self.calls
            .lock()
            .unwrap()
            .push(plugins.iter().map(|p| p.name().to_string()).collect());
        Ok(StyleOutput {
            css: run_plugins(plugins, css)?,
            map: None,
        })
    }
}

pub struct FailingStyleEngine(pub TransformError);

impl StyleEngine for FailingStyleEngine {
    fn process(
        &self,
        _: &[Box<dyn StylePlugin>],
        _: &str,
        _: &StyleOptions,
    ) -> Result<StyleOutput, TransformError> {
        Err(self.0.clone())
    }
}

pub fn recording_engines<'e>(
    script: &'e RecordingScriptEngine,
    style: &'e RecordingStyleEngine,
) -> Engines<'e> {
    Engines { script, style }
}
