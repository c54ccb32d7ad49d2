//! Codegen module for the component compiler
//!
//! Assembles the component's script module: the compiled script body wrapped
//! in an invoked function, the scoped template string, and the glue that
//! exports the component definition.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

use crate::component::Tag;
use crate::config::FileMeta;
use crate::transform::{ScriptEngine, ScriptOptions};
use crate::validate::CompileError;

pub const SCRIPT_HOLDER: &str = "__vue_script__";
pub const TEMPLATE_HOLDER: &str = "__vue_template__";

const MODULE_HEADER: &str = "exports.__esModule = true;var __vue_script__, __vue_template__;";

/// Guarantees the holder is an object, attaches the template to it (or to
/// `options` when the script produced a constructor) and exports it.
const MODULE_TAIL: &str = r#"__vue_script__ = __vue_script__ || {};
    if(__vue_template__) {
      (typeof __vue_script__ === "function" ?
      (__vue_script__.options || (__vue_script__.options = {}))
      : __vue_script__).template = __vue_template__;
    }
    exports.default = __vue_script__;"#;

lazy_static! {
    static ref EXPORT_DEFAULT_RE: Regex = Regex::new(r"export\s+default").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptAssembly {
    pub code: String,
    pub map: Option<Value>,
}

/// The script body becomes the inside of a function whose return value is the
/// component definition, so its default export turns into a `return`.
pub fn rewrite_default_export(script: &str) -> Cow<'_, str> {
    EXPORT_DEFAULT_RE.replacen(script, 1, "return")
}

/// Copy the caller's options and set the fields downstream source-map
/// consumers rely on.
pub fn script_options_for(
    base: &ScriptOptions,
    meta: &FileMeta,
    script: &Tag,
) -> ScriptOptions {
    let filename = meta.virtual_path();
    let mut options = base.clone();
    options.source_map = true;
    options.source_map_target = Some(format!("{}.map", filename));
    options.source_file_name = Some(filename.clone());
    options.filename = Some(filename);
    if options.lang.is_none() {
        options.lang = script.attribs.value("lang").map(str::to_string);
    }
    options
}

/// Build the component module.
pub fn assemble_script(
    script: Option<&Tag>,
    template_literal: Option<&str>,
    options: &ScriptOptions,
    meta: &FileMeta,
    engine: &dyn ScriptEngine,
) -> Result<ScriptAssembly, CompileError> {
    let mut code = String::from(MODULE_HEADER);
    let mut map = None;

    if let Some(tag) = script {
        let body = rewrite_default_export(&tag.contents);
        let engine_options = script_options_for(options, meta, tag);

        log::debug!(
            "compiling <script> of {} as {}",
            meta.path,
            engine_options.filename.as_deref().unwrap_or_default()
        );
        let output = engine.compile(&body, &engine_options)?;

        code.push_str(&format!(
            "{} = (function(){{{}\n}})();",
            SCRIPT_HOLDER, output.code
        ));
        map = output.map;
    }

    if let Some(literal) = template_literal {
        code.push_str(&format!("{} = '{}';", TEMPLATE_HOLDER, literal));
    }

    code.push_str(MODULE_TAIL);

    Ok(ScriptAssembly { code, map })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingScriptEngine, RecordingScriptEngine};
    use crate::validate::TransformError;
    use pretty_assertions::assert_eq;

    fn meta() -> FileMeta {
        FileMeta::new("client/Hello.vue", None, "1")
    }

    #[test]
    fn test_rewrite_default_export() {
        assert_eq!(
            rewrite_default_export("export default { name: 'x' }"),
            "return { name: 'x' }"
        );
        assert_eq!(
            rewrite_default_export("export\n  default Foo"),
            "return Foo"
        );
        assert_eq!(rewrite_default_export("const a = 1;"), "const a = 1;");
    }

    #[test]
    fn test_no_script_no_template() {
        let engine = RecordingScriptEngine::default();
        let out = assemble_script(None, None, &ScriptOptions::default(), &meta(), &engine).unwrap();
        assert_eq!(out.code, format!("{}{}", MODULE_HEADER, MODULE_TAIL));
        assert!(out.map.is_none());
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_full_module_layout() {
        let engine = RecordingScriptEngine::default();
        let tag = Tag::new("script", "export default { name: 'x' }");
        let out = assemble_script(
            Some(&tag),
            Some("<p __v1>hi</p>"),
            &ScriptOptions::default(),
            &meta(),
            &engine,
        )
        .unwrap();

        let expected = format!(
            "{}__vue_script__ = (function(){{return {{ name: 'x' }}\n}})();__vue_template__ = '<p __v1>hi</p>';{}",
            MODULE_HEADER, MODULE_TAIL
        );
        assert_eq!(out.code, expected);
        assert!(!out.code.contains("export default"));
        assert!(out.map.is_some());
    }

    #[test]
    fn test_mandatory_options_override_caller() {
        let engine = RecordingScriptEngine::default();
        let mut caller = ScriptOptions {
            source_map: false,
            filename: Some("wrong.js".to_string()),
            ..ScriptOptions::default()
        };
        caller
            .extra
            .insert("compact".to_string(), Value::Bool(true));

        let meta = FileMeta::new("ui/B.vue", Some("acme:ui".to_string()), "1");
        let tag = Tag::new("script", "export default {}")
            .with_attr("lang", crate::component::AttrValue::Value("ts".into()));
        assemble_script(Some(&tag), None, &caller, &meta, &engine).unwrap();

        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        let (source, options) = &calls[0];
        assert_eq!(source, "return {}");
        assert!(options.source_map);
        assert_eq!(options.filename.as_deref(), Some("/packages/acme:ui/ui/B.vue"));
        assert_eq!(options.source_file_name, options.filename);
        assert_eq!(
            options.source_map_target.as_deref(),
            Some("/packages/acme:ui/ui/B.vue.map")
        );
        assert_eq!(options.lang.as_deref(), Some("ts"));
        assert_eq!(options.extra.get("compact"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_engine_errors_propagate_unchanged() {
        let engine = FailingScriptEngine(TransformError::script("Unexpected token").with_offset(Some(4)));
        let tag = Tag::new("script", "export default {").at(30, 38);
        let err = assemble_script(Some(&tag), None, &ScriptOptions::default(), &meta(), &engine)
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::Transform(TransformError::script("Unexpected token").with_offset(Some(4)))
        );
    }
}
