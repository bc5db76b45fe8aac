//! Inbound frame validation rules.

use photohub_core::error::AppError;

/// Validates a raw inbound text frame before it is parsed.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        assert!(validate_inbound("{}", 16).is_ok());
        assert!(validate_inbound("   ", 16).is_err());
        assert!(validate_inbound(&"x".repeat(17), 16).is_err());
    }
}
