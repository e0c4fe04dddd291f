//! Configuration validation, run once at startup.

use super::Config;
use irc_proto::Sid;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.sid is invalid: {0}")]
    InvalidSid(String),
    #[error("linking is enabled but linking.password is not set")]
    MissingLinkPassword,
    #[error("linking peer '{0}' has an invalid sid: {1}")]
    InvalidPeerSid(String, String),
    #[error("operator '{0}' is listed more than once")]
    DuplicateOperator(String),
}

/// Validate a configuration, returning every error found (not just the first).
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if Sid::parse(&config.server.sid).is_err() {
        errors.push(ValidationError::InvalidSid(config.server.sid.clone()));
    }

    if config.linking.enabled && config.linking.password.is_none() {
        errors.push(ValidationError::MissingLinkPassword);
    }

    for peer in &config.linking.peers {
        if Sid::parse(&peer.sid).is_err() {
            errors.push(ValidationError::InvalidPeerSid(peer.name.clone(), peer.sid.clone()));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for op in &config.operators {
        if !seen.insert(op.name.clone()) {
            errors.push(ValidationError::DuplicateOperator(op.name.clone()));
        }
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

    fn base_config() -> Config {
        toml::from_str(
            r#"
[server]
name = "irc.example.com"
sid = "001"
listen = "127.0.0.1:6667"
"#,
        )
        .unwrap()
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn empty_name_fails() {
        let mut config = base_config();
        config.server.name.clear();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingServerName)));
    }

    #[test]
    fn bad_sid_fails() {
        let mut config = base_config();
        config.server.sid = "xx".to_string();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidSid(_))));
    }

    #[test]
    fn linking_enabled_without_password_fails() {
        let mut config = base_config();
        config.linking.enabled = true;
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingLinkPassword)));
    }
}
