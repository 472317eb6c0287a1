//! Prompt validation for scene generation.

use crate::error::CoreError;

/// Reject prompts that are empty or only whitespace.
///
/// The prompt is returned as typed; the service receives exactly what the
/// user entered.
pub fn validate_prompt(prompt: &str) -> Result<&str, CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    Ok(prompt)
}
