use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of the function an invocation targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionIdentity {
    pub plugin_name: Option<String>,
    pub name: String,
}

impl FunctionIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            plugin_name: None,
            name: name.into(),
        }
    }

    pub fn in_plugin(plugin_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            plugin_name: Some(plugin_name.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.plugin_name {
            Some(plugin) => write!(f, "{}.{}", plugin, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Named arguments passed to a function or prompt render
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KernelArguments(Map<String, Value>);

impl KernelArguments {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build arguments with a single `input` entry
    pub fn with_input(input: impl Into<Value>) -> Self {
        let mut args = Self::new();
        args.insert("input", input);
        args
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for key, `None` if missing or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert or overwrite an argument, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for KernelArguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for KernelArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Value produced by a function plus free-form metadata (token usage, rendered prompt, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    value: Value,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl FunctionResult {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(value: impl Into<Value>, metadata: Map<String, Value>) -> Self {
        Self {
            value: value.into(),
            metadata,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Deserialize the value into `T`
    pub fn value_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.value)
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
    }
}

impl fmt::Display for FunctionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) => f.write_str(s),
            Value::Null => Ok(()),
            other => write!(f, "{}", other),
        }
    }
}
