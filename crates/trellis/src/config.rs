use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub kernel: KernelConfig,

    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct KernelConfig {
    #[serde(default = "default_plugin")]
    pub plugin: String,

    #[serde(default = "default_function")]
    pub function: String,

    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Prepended to every reply of the echo model
    #[serde(default)]
    pub reply_prefix: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FiltersConfig {
    /// Logging function filters, registered at build time
    #[serde(default = "default_function_filters")]
    pub function: Vec<String>,

    /// Logging prompt filters, appended to the built kernel
    #[serde(default = "default_prompt_filters")]
    pub prompt: Vec<String>,

    /// Functions to cancel (bare or Plugin.Function names)
    #[serde(default)]
    pub cancel: Vec<String>,

    /// Cancel every invocation
    #[serde(default)]
    pub cancel_all: bool,

    /// Arguments forced before every invocation
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,

    /// Replaces every rendered prompt
    #[serde(default)]
    pub safe_prompt: Option<String>,

    /// Replaces every function result
    #[serde(default)]
    pub result_override: Option<String>,
}

fn default_plugin() -> String {
    "MyPlugin".to_string()
}

fn default_function() -> String {
    "MyFunction".to_string()
}

fn default_prompt() -> String {
    "What is Seattle".to_string()
}

fn default_function_filters() -> Vec<String> {
    vec![
        "FirstFunctionFilter".to_string(),
        "SecondFunctionFilter".to_string(),
    ]
}

fn default_prompt_filters() -> Vec<String> {
    vec!["FirstPromptFilter".to_string()]
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            plugin: default_plugin(),
            function: default_function(),
            prompt: default_prompt(),
            reply_prefix: String::new(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            function: default_function_filters(),
            prompt: default_prompt_filters(),
            cancel: Vec::new(),
            cancel_all: false,
            arguments: BTreeMap::new(),
            safe_prompt: None,
            result_override: None,
        }
    }
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

        Ok(config)
    } else {
        Ok(Config::default())
    }
}
