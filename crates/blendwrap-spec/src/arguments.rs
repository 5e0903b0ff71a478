//! The opaque export-argument mapping forwarded to the export capability.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SpecError, SpecResult};

/// Export arguments, keyed by name.
///
/// Values are forwarded verbatim, so nested objects and arrays survive the
/// trip through the transfer artifact unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportArguments(Map<String, Value>);

impl ExportArguments {
    /// Decodes `--export_args`. The top level must be a JSON object.
    pub fn parse_json(raw: &str) -> SpecResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(SpecError::InvalidExportArgs)?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SpecError::ExportArgsNotObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Iterates over argument names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no arguments were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON, as passed on the command line.
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for ExportArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
