// ABOUTME: Placeholder value mapping used when rendering templates
// ABOUTME: Collects values from key=value pairs, YAML/JSON files, and configuration defaults

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use super::error::{Result, TemplateError};

/// Ordered mapping from placeholder name to replacement text.
///
/// Later insertions override earlier ones, so sources are layered by
/// inserting the lowest-precedence values first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateContext {
    variables: IndexMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse variables from `key=value` pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut context = Self::new();

        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    context.set(key.trim(), value);
                }
                _ => return Err(TemplateError::InvalidVariable(pair.to_string())),
            }
        }

        Ok(context)
    }

    /// Parse a YAML mapping of scalar values
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let mapping = match value {
            serde_yaml::Value::Mapping(mapping) => mapping,
            // An empty document is an empty set of variables
            serde_yaml::Value::Null => return Ok(Self::new()),
            _ => return Err(TemplateError::NotAMapping),
        };

        let mut context = Self::new();
        for (key, value) in mapping {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                other => return Err(TemplateError::InvalidKey(format!("{:?}", other))),
            };
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => return Err(TemplateError::NonScalarValue { key }),
            };
            context.set(key, text);
        }

        Ok(context)
    }

    /// Parse a JSON object of scalar values
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let object = match value {
            serde_json::Value::Object(object) => object,
            _ => return Err(TemplateError::NotAMapping),
        };

        let mut context = Self::new();
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                _ => return Err(TemplateError::NonScalarValue { key }),
            };
            context.set(key, text);
        }

        Ok(context)
    }

    /// Load a variables file, picking the parser from the file extension
    pub async fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|v| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// Merge another context on top of this one
    pub fn extend(&mut self, other: TemplateContext) {
        self.variables.extend(other.variables);
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.set(key, value);
        }
        context
    }
}
