use crate::api::ApiError;

/// A single form field that failed validation, surfaced next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Crate-wide error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request rejected, timed out, or the transport dropped.
    #[error("network failure: {0}")]
    Network(#[from] ApiError),

    /// Missing or malformed form fields; submission is blocked.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Bad credentials, expired token or no session.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Messaging channel is not connected or no conversation is open.
    #[error("messaging channel not connected")]
    NotConnected,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_counts_fields() {
        let err = Error::Validation(vec![
            FieldError::new("email", "Por favor, insira um email válido."),
            FieldError::new("password", "Este campo é obrigatório."),
        ]);
        assert_eq!(err.to_string(), "validation failed on 2 field(s)");
    }

    #[test]
    fn api_error_converts_to_network() {
        let err = Error::from(ApiError::Rejected("Credenciais inválidas".to_string()));
        assert!(matches!(err, Error::Network(_)));
        assert!(err.to_string().contains("Credenciais inválidas"));
    }
}
