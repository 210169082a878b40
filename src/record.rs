use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::Error;

/// Flat field-name → value mapping for one render.
///
/// Empty values are kept as given but read back as absent, so a field set
/// to `""` is skipped exactly like a missing one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Value for `name`, or `None` when absent or empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a JSON object, flattening nested objects into the top level.
    ///
    /// Strings are taken verbatim, numbers and booleans are stringified and
    /// `null` entries are dropped. Arrays are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidRecord(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(Error::InvalidRecord("expected a JSON object at the top level".into()));
        };
        let mut record = Record::new();
        flatten_into(&mut record, map)?;
        Ok(record)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_json_str(&json)
    }
}

fn flatten_into(record: &mut Record, map: serde_json::Map<String, Value>) -> Result<(), Error> {
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::String(s) => record.insert(key, s),
            Value::Number(n) => record.insert(key, n.to_string()),
            Value::Bool(b) => record.insert(key, b.to_string()),
            // Section objects from the extractor: children land at the root.
            Value::Object(inner) => flatten_into(record, inner)?,
            Value::Array(_) => {
                return Err(Error::InvalidRecord(format!(
                    "field '{key}' is an array; values must be strings"
                )));
            }
        }
    }
    Ok(())
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
