pub mod athletes;
pub mod auth;
pub mod exercises;
pub mod health;
pub mod notes;
pub mod sets;
pub mod teams;
pub mod upload;
pub mod workouts;

use crate::error::ApiError;

/// Trimmed, non-empty value of a required field.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", field)))
}

/// Trimmed optional field; blank strings count as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  Sam ".into()), "name").unwrap(), "Sam");
        assert!(required(Some("   ".into()), "name").is_err());
        let err = required(None, "email").unwrap_err();
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some(" x ".into())), Some("x".to_string()));
        assert_eq!(optional(Some("".into())), None);
        assert_eq!(optional(None), None);
    }
}
