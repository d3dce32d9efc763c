use std::path::Path;

use crate::error::GenerateError;
use crate::schema::types::DeclarationFile;

/// Parse a declaration file. `.json` files are read as JSON, anything
/// else as YAML.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if the file cannot be read, or
/// [`GenerateError::Yaml`] / [`GenerateError::Json`] if it is malformed.
pub fn parse_declarations(path: &Path) -> Result<DeclarationFile, GenerateError> {
    let content = std::fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        return Ok(serde_json::from_str(&content)?);
    }
    parse_declarations_str(&content)
}

/// Parse a YAML declaration file from a string.
pub fn parse_declarations_str(yaml: &str) -> Result<DeclarationFile, GenerateError> {
    let file: DeclarationFile = serde_yaml::from_str(yaml)?;
    Ok(file)
}
