//! Instance document YAML parser.

use std::path::Path;

use super::types::InstanceSpec;
use crate::error::{Error, Result};

/// Parse an instance spec from a YAML string.
pub fn parse_instance(yaml: &str) -> Result<InstanceSpec> {
    if yaml.trim().is_empty() {
        return Err(Error::Parse("Empty instance definition".to_string()));
    }

    let spec: InstanceSpec = serde_yaml::from_str(yaml).map_err(|e| {
        let msg = e.to_string();
        if let Some(field) = extract_missing_field(&msg) {
            Error::Parse(format!("Missing required field: {}", field))
        } else {
            Error::Parse(format!("Invalid YAML: {}", msg))
        }
    })?;
    Ok(spec)
}

/// Parse an instance spec from a file path.
pub fn parse_instance_file(path: &Path) -> Result<InstanceSpec> {
    let content = std::fs::read_to_string(path)?;
    parse_instance(&content)
}

fn extract_missing_field(error_message: &str) -> Option<&str> {
    let marker = "missing field `";
    let start = error_message.find(marker)? + marker.len();
    let rest = &error_message[start..];
    let end = rest.find('`')?;
    Some(&rest[..end])
}
