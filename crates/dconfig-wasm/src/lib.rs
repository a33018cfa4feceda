//! WASM bindings for the dconfig parser.
//!
//! Exposes `check()` and `get()` to JavaScript via wasm-bindgen. Values come
//! back as plain JS data: numbers, strings, arrays and objects.

use dconfig_parser::{ConfigValue, Parser, Path};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Validate dconfig source. Throws a JS error describing the first problem.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<(), JsError> {
    load(source).map(|_| ()).map_err(|e| JsError::new(&e))
}

/// Parse `source` and return the value at `path` (e.g. `server.hosts[0]`).
///
/// Returns `undefined` when nothing lives at that path.
/// Throws a JS error if the source or the path does not parse, or if the
/// value holds an integer outside `Number.MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER`
/// (a JS number could not hold it exactly).
#[wasm_bindgen]
pub fn get(source: &str, path: &str) -> Result<JsValue, JsError> {
    match query(source, path).map_err(|e| JsError::new(&e))? {
        Some(value) => value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsError::new(&e.to_string())),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Get the parser version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn load(source: &str) -> Result<ConfigValue, String> {
    let root = Parser::parse(source).map_err(|e| e.to_string())?;
    if root.is_none() {
        return Err("Config error: invalid config (input ended mid-statement)".into());
    }
    Ok(root)
}

/// `Number.MAX_SAFE_INTEGER`.
const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

fn query(source: &str, path: &str) -> Result<Option<ConfigValue>, String> {
    let path: Path = path.parse().map_err(|e: dconfig_parser::PathError| e.to_string())?;
    let root = load(source)?;
    let found = root.lookup(&path);
    if let Some(value) = found {
        check_safe_integers(value)?;
    }
    Ok(found.cloned())
}

fn check_safe_integers(value: &ConfigValue) -> Result<(), String> {
    match value {
        ConfigValue::Int(n) if !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(n) => Err(format!(
            "integer {n} cannot be represented exactly as a JavaScript number"
        )),
        ConfigValue::Object(members) => members.values().try_for_each(check_safe_integers),
        ConfigValue::Array(items) => items.iter().try_for_each(check_safe_integers),
        _ => Ok(()),
    }
}
