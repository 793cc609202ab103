//! JSON Schema check for validation replies.
//!
//! The schema lives in schema/validation_response.schema.json. Checking is
//! advisory: callers decide what to do with a non-conforming reply.

use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use thiserror::Error;

use crate::types::ParsedResponse;

/// Embedded reply schema (loaded at compile time).
const VALIDATION_RESPONSE_SCHEMA_JSON: &str =
    include_str!("../../schema/validation_response.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: JsonValue = serde_json::from_str(VALIDATION_RESPONSE_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Check a parsed reply against the validation reply schema.
///
/// Returns the list of violations, each with its JSON pointer, on failure.
pub fn check_response_schema(response: &ParsedResponse) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;
    let instance = JsonValue::Object(response.clone());

    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
