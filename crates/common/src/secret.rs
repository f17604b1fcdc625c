//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types
//! for every sensitive value the service holds: the token signing secret,
//! database credentials embedded in connection URLs, and bearer tokens.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` while holding one stays safe to log. Secrets are zeroized
//! when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct SigningConfig {
//!     issuer: String,
//!     secret: SecretString,
//! }
//!
//! let config = SigningConfig {
//!     issuer: "medica-identity".to_string(),
//!     secret: SecretString::from("correct-horse-battery-staple"),
//! };
//!
//! // Debug output never shows the secret
//! assert!(!format!("{config:?}").contains("correct-horse"));
//!
//! // Access must be explicit
//! let raw: &str = config.secret.expose_secret();
//! assert_eq!(raw, "correct-horse-battery-staple");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("jwt-signing-key");
        assert_eq!(secret.expose_secret(), "jwt-signing-key");
    }

    #[test]
    fn test_deserialize_keeps_value_hidden() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct StorageCredentials {
            bucket: String,
            access_key: SecretString,
        }

        let json = r#"{"bucket": "attachments", "access_key": "ak-0001"}"#;
        let creds: StorageCredentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.access_key.expose_secret(), "ak-0001");

        let debug = format!("{creds:?}");
        assert!(debug.contains("attachments"));
        assert!(!debug.contains("ak-0001"));
    }
}
