use crate::dto::v1::SuggestInput;

/// The host sent something `suggest` cannot read.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid suggest input: empty")]
    Empty,
    #[error("Invalid suggest input: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_suggest_input(input_json: &str) -> Result<SuggestInput, InputError> {
    let trimmed = input_json.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(serde_json::from_str(trimmed)?)
}
