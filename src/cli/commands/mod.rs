//! CLI command implementations

pub mod inspect;
pub mod sql;
pub mod validate;

use crate::cli::error::CliError;
use crate::config::SdkConfig;
use crate::schema::{Schema, SchemaDocument};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Load input content from file or stdin
fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Parse a schema document; `.json` inputs are JSON, everything else (stdin included) YAML
pub(crate) fn load_document(input: &str) -> Result<SchemaDocument, CliError> {
    let content = load_input(input)?;
    let is_json = Path::new(input)
        .extension()
        .is_some_and(|ext| ext == "json");

    let document = if is_json {
        SchemaDocument::from_json_str(&content)?
    } else {
        SchemaDocument::from_yaml_str(&content)?
    };
    Ok(document)
}

/// Read the optional TOML config, defaults otherwise
pub(crate) fn load_config(config: Option<&Path>) -> Result<SdkConfig, CliError> {
    match config {
        Some(path) => Ok(SdkConfig::from_file(path)?),
        None => Ok(SdkConfig::default()),
    }
}

pub(crate) fn load_schema(input: &str, config: &SdkConfig) -> Result<Schema, CliError> {
    Ok(load_document(input)?.into_schema(config.sql.clone())?)
}
