//! Script transform engine.
//!
//! [`ScriptEngine`] is the seam between the compiler and whatever turns the
//! script region into executable code. [`OxcScriptEngine`] is the native
//! implementation: oxc parses, transforms and prints the script with a
//! source map.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::{ParseOptions, Parser};
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::validate::TransformError;

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS & OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Options handed to the script engine.
///
/// The compiler always overwrites `source_map`, `filename`,
/// `source_file_name` and `source_map_target`. Anything in `extra` is caller
/// configuration passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOptions {
    #[serde(default)]
    pub source_map: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map_target: Option<String>,
    /// Script dialect (`ts`, `tsx`, `jsx`); plain JavaScript when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutput {
    pub code: String,
    pub map: Option<Value>,
}

pub trait ScriptEngine: Send + Sync {
    fn compile(&self, source: &str, options: &ScriptOptions)
        -> Result<ScriptOutput, TransformError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// OXC ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Script engine backed by oxc.
///
/// The script body is compiled as the inside of a function, so a top-level
/// `return` is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcScriptEngine;

impl OxcScriptEngine {
    fn source_type(lang: Option<&str>) -> SourceType {
        match lang.map(str::to_ascii_lowercase).as_deref() {
            Some("ts") | Some("typescript") => SourceType::ts(),
            Some("tsx") => SourceType::tsx(),
            Some("jsx") => SourceType::jsx(),
            _ => SourceType::mjs(),
        }
    }
}

impl ScriptEngine for OxcScriptEngine {
    fn compile(
        &self,
        source: &str,
        options: &ScriptOptions,
    ) -> Result<ScriptOutput, TransformError> {
        let allocator = Allocator::default();
        let source_type = Self::source_type(options.lang.as_deref());
        let filename = options
            .filename
            .clone()
            .unwrap_or_else(|| "component.js".to_string());

        let parsed = Parser::new(&allocator, source, source_type)
            .with_options(ParseOptions {
                allow_return_outside_function: true,
                ..ParseOptions::default()
            })
            .parse();

        if let Some(diagnostic) = parsed.errors.first() {
            let offset = diagnostic
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map(|label| label.offset());
            return Err(TransformError::script(diagnostic.to_string()).with_offset(offset));
        }

        let mut program = parsed.program;
        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();

        let transform_options = TransformOptions::default();
        let transformed = Transformer::new(&allocator, Path::new(&filename), &transform_options)
            .build_with_scoping(scoping, &mut program);

        if let Some(diagnostic) = transformed.errors.first() {
            return Err(TransformError::script(diagnostic.to_string()));
        }

        let output = Codegen::new()
            .with_options(CodegenOptions {
                source_map_path: options.source_map.then(|| PathBuf::from(&filename)),
                ..CodegenOptions::default()
            })
            .build(&program);

        let map = match output.map {
            Some(map) => Some(finish_source_map(&map.to_json_string(), options)?),
            None => None,
        };

        log::debug!(
            "oxc compiled {} ({} bytes in, {} bytes out)",
            filename,
            source.len(),
            output.code.len()
        );

        Ok(ScriptOutput {
            code: output.code,
            map,
        })
    }
}

/// Stamp the virtual file names from `options` onto a JSON source map.
fn finish_source_map(json: &str, options: &ScriptOptions) -> Result<Value, TransformError> {
    let mut map: Value = serde_json::from_str(json)
        .map_err(|e| TransformError::script(format!("Invalid source map: {}", e)))?;

    if let Value::Object(fields) = &mut map {
        if let Some(target) = &options.source_map_target {
            fields.insert("file".to_string(), Value::String(target.clone()));
        }
        if let Some(source_file) = &options.source_file_name {
            fields.insert(
                "sources".to_string(),
                Value::Array(vec![Value::String(source_file.clone())]),
            );
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_for(path: &str) -> ScriptOptions {
        ScriptOptions {
            source_map: true,
            filename: Some(path.to_string()),
            source_file_name: Some(path.to_string()),
            source_map_target: Some(format!("{}.map", path)),
            ..ScriptOptions::default()
        }
    }

    #[test]
    fn test_options_pass_through_extra_settings() {
        let options: ScriptOptions =
            serde_json::from_str(r#"{"sourceMap": false, "compact": true, "lang": "ts"}"#).unwrap();
        assert_eq!(options.lang.as_deref(), Some("ts"));
        assert_eq!(options.extra.get("compact"), Some(&Value::Bool(true)));

        let round = serde_json::to_value(&options).unwrap();
        assert_eq!(round["compact"], Value::Bool(true));
        assert_eq!(round["sourceMap"], Value::Bool(false));
    }

    #[test]
    fn test_oxc_compiles_top_level_return() {
        let output = OxcScriptEngine
            .compile("return { name: 'x' }", &options_for("/a.vue"))
            .unwrap();
        assert!(output.code.contains("return"));
        assert!(output.code.contains("name"));

        let map = output.map.expect("source map requested");
        assert_eq!(map["file"], Value::String("/a.vue.map".to_string()));
        assert_eq!(map["sources"][0], Value::String("/a.vue".to_string()));
    }

    #[test]
    fn test_oxc_strips_typescript() {
        let options = ScriptOptions {
            lang: Some("ts".to_string()),
            ..options_for("/b.vue")
        };
        let output = OxcScriptEngine
            .compile("const n: number = 1;\nreturn { n };", &options)
            .unwrap();
        assert!(!output.code.contains(": number"));
    }

    #[test]
    fn test_oxc_reports_syntax_errors() {
        let err = OxcScriptEngine
            .compile("return {", &options_for("/c.vue"))
            .unwrap_err();
        assert_eq!(err.stage, crate::validate::TransformStage::Script);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_oxc_without_source_map() {
        let output = OxcScriptEngine
            .compile("return 1;", &ScriptOptions::default())
            .unwrap();
        assert!(output.map.is_none());
    }
}
