//! Loading argument bags and template params from files
//!
//! Both YAML and JSON are accepted; JSON is a subset of YAML.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::function::Args;
use crate::param::TemplateParams;

fn load_yaml<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {what} file {}", path.display()))
}

pub fn load_args(path: &Path) -> Result<Args> {
    load_yaml(path, "arguments")
}

pub fn load_template_params(path: &Path) -> Result<TemplateParams> {
    load_yaml(path, "template params")
}
