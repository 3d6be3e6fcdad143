//! Investigator dashboard gate.

use subtle::ConstantTimeEq;

use crate::config::AppConfig;

/// Check the supplied passkey against the configured one.
///
/// Constant-time comparison to prevent timing attacks on the passkey. With
/// no passkey configured the dashboard stays locked.
pub fn verify_passkey(config: &AppConfig, supplied: &str) -> bool {
    let Some(ref expected) = config.investigator_passkey else {
        return false;
    };

    let supplied = supplied.as_bytes();
    let expected = expected.as_bytes();
    supplied.len() == expected.len() && supplied.ct_eq(expected).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(passkey: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.investigator_passkey = passkey.map(str::to_string);
        config
    }

    #[test]
    fn correct_passkey_unlocks() {
        let config = config_with(Some("admin123"));
        assert!(verify_passkey(&config, "admin123"));
    }

    #[test]
    fn wrong_passkey_is_rejected() {
        let config = config_with(Some("admin123"));
        assert!(!verify_passkey(&config, "admin124"));
        assert!(!verify_passkey(&config, "admin12"));
        assert!(!verify_passkey(&config, ""));
    }

    #[test]
    fn unconfigured_gate_stays_locked() {
        let config = config_with(None);
        assert!(!verify_passkey(&config, "anything"));
        assert!(!verify_passkey(&config, ""));
    }
}
