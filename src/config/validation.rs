//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Maximum length of `server.name` in bytes.
pub const MAX_SERVER_NAME_LEN: usize = 32;

/// Smallest frame limit that fits every frame the server writes, with
/// maximum-length fields fully escaped.
pub const MIN_FRAME_BYTES: usize = 2048;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.name must not contain whitespace, got '{0}'")]
    InvalidServerName(String),
    #[error("server.name must be at most 32 bytes, got {0}")]
    ServerNameTooLong(usize),
    #[error("limits.outbound_queue must be at least 1")]
    ZeroOutboundQueue,
    #[error("limits.max_frame_bytes must be at least 2048, got {0}")]
    FrameLimitTooSmall(usize),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = &config.server.name;
    if name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    } else if name.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidServerName(name.clone()));
    } else if name.len() > MAX_SERVER_NAME_LEN {
        errors.push(ValidationError::ServerNameTooLong(name.len()));
    }

    if config.limits.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }
    if config.limits.max_frame_bytes < MIN_FRAME_BYTES {
        errors.push(ValidationError::FrameLimitTooSmall(
            config.limits.max_frame_bytes,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(body: &str) -> Config {
        toml::from_str(&format!("[listen]\naddress = \"127.0.0.1:5050\"\n{body}")).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&config("")).is_ok());
    }

    #[test]
    fn reports_every_error() {
        let errors = validate(&config(
            "[server]\nname = \"\"\n[limits]\noutbound_queue = 0\nmax_frame_bytes = 100\n",
        ))
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::MissingServerName));
        assert!(matches!(errors[1], ValidationError::ZeroOutboundQueue));
        assert!(matches!(errors[2], ValidationError::FrameLimitTooSmall(100)));
    }

    #[test]
    fn rejects_whitespace_in_server_name() {
        let errors = validate(&config("[server]\nname = \"chit chat\"\n")).unwrap_err();
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidServerName(name) if name == "chit chat"
        ));
    }

    #[test]
    fn rejects_long_server_name() {
        let errors = validate(&config(&format!("[server]\nname = \"{}\"\n", "s".repeat(33))))
            .unwrap_err();
        assert!(matches!(errors[0], ValidationError::ServerNameTooLong(33)));
        assert!(validate(&config(&format!("[server]\nname = \"{}\"\n", "s".repeat(32)))).is_ok());
    }

    #[test]
    fn min_frame_fits_worst_case_server_frames() {
        use chitchat_proto::{ChatMessage, MAX_BODY_LEN, MAX_IDENTITY_LEN};

        // U+0001 is the widest character after JSON escaping (six bytes).
        let wide = |n: usize| "\u{1}".repeat(n);
        let framed = |msg: &ChatMessage| serde_json::to_string(msg).unwrap().len() + 1;

        let relayed = ChatMessage::new(i64::MAX, wide(MAX_IDENTITY_LEN), wide(MAX_BODY_LEN));
        assert!(framed(&relayed) <= MIN_FRAME_BYTES);

        let announcement = ChatMessage::new(
            i64::MAX,
            wide(MAX_SERVER_NAME_LEN),
            format!(
                "Participant {} joined Chit Chat at Lamport time {}",
                wide(MAX_IDENTITY_LEN),
                i64::MAX
            ),
        );
        assert!(framed(&announcement) <= MIN_FRAME_BYTES);
    }
}
