use serde::Serialize;
use tabline::{CompileOptions, GroupingLocation, TablineError};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct CompileError {
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

/// A lint or compile diagnostic, flattened for the editor
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorDiagnostic {
    message: String,
    kind: &'static str,
    severity: &'static str,
    location: Option<tabline::playback::Location>,
}

fn error_to_compile_error(e: TablineError) -> CompileError {
    match e {
        TablineError::ParseError { line, column, message } => CompileError {
            message,
            line: Some(line),
            column: Some(column),
        },
        TablineError::OptionsError(msg) => CompileError {
            message: msg,
            line: None,
            column: None,
        },
    }
}

fn to_js_error(e: TablineError) -> JsValue {
    let error = error_to_compile_error(e);
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_editor_diagnostics(diagnostics: &[tabline::Diagnostic]) -> Vec<EditorDiagnostic> {
    diagnostics
        .iter()
        .map(|d| EditorDiagnostic {
            message: d.message.clone(),
            kind: d.kind.as_str(),
            severity: d.severity.as_str(),
            location: d.location,
        })
        .collect()
}

/// Compile a persisted tab to its playback timeline
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<JsValue, JsValue> {
    let compiled = tabline::compile(source).map_err(to_js_error)?;
    to_js(&compiled)
}

/// Compile with options given as YAML, e.g. `defaultBpm: 90`
#[wasm_bindgen]
pub fn compile_with_options(source: &str, options: &str) -> Result<JsValue, JsValue> {
    let options = CompileOptions::from_yaml(options).map_err(to_js_error)?;
    let compiled = tabline::compile_with_options(source, &options).map_err(to_js_error)?;
    to_js(&compiled)
}

/// Compile one section, subsection or chord sequence for preview
#[wasm_bindgen]
pub fn preview(
    source: &str,
    section_index: usize,
    subsection_index: Option<usize>,
    chord_sequence_index: Option<usize>,
) -> Result<JsValue, JsValue> {
    let location = GroupingLocation {
        section_index,
        subsection_index,
        chord_sequence_index,
    };
    let compiled = tabline::preview(source, &location).map_err(to_js_error)?;
    to_js(&compiled)
}

/// Lint a tab and return diagnostics as a JSON array
#[wasm_bindgen]
pub fn lint(source: &str) -> String {
    let diagnostics = match tabline::parse(source) {
        Ok(document) => to_editor_diagnostics(&tabline::lint(&document)),
        Err(e) => {
            let error = error_to_compile_error(e);
            vec![EditorDiagnostic {
                message: match (error.line, error.column) {
                    (Some(line), Some(column)) => format!("{}:{}: {}", line, column, error.message),
                    _ => error.message,
                },
                kind: "parse-error",
                severity: "error",
                location: None,
            }]
        }
    };

    serde_json::to_string(&diagnostics).unwrap_or_else(|_| "[]".to_string())
}

/// Names of the bundled demo tabs
#[wasm_bindgen]
pub fn list_demo_tabs() -> Vec<String> {
    tabline_library::list_tabs()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Source of a bundled demo tab
#[wasm_bindgen]
pub fn get_demo_tab(name: &str) -> Option<String> {
    tabline_library::get_tab(name).map(|tab| tab.content)
}
