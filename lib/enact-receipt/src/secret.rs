use std::env;

use crate::error::ReceiptError;

const ENV_VAR: &str = "ENACT_SECRET";
const MINIMUM_LENGTH: usize = 32;

/// The key receipts are signed and verified under. Wrapped rather than passed around as a
/// bare `String` so the minimum-length check can only be bypassed at the one call site that
/// opts into it.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    /// Accepts `explicit` if given, otherwise falls back to `ENACT_SECRET`. Refuses anything
    /// shorter than 32 characters unless `allow_insecure` is set, which exists for local dev
    /// and tests, never for a production deployment.
    pub fn resolve(explicit: Option<String>, allow_insecure: bool) -> Result<Secret, ReceiptError> {
        let raw = match explicit.or_else(|| env::var(ENV_VAR).ok()) {
            Some(raw) => raw,
            None => return Err(ReceiptError::MissingSecret),
        };
        if !allow_insecure && raw.len() < MINIMUM_LENGTH {
            return Err(ReceiptError::SecretTooShort { actual: raw.len(), minimum: MINIMUM_LENGTH });
        }
        Ok(Secret(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // ENACT_SECRET is process-global env state; serialize tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn explicit_secret_takes_priority_over_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(ENV_VAR, "x".repeat(64));
        let secret = Secret::resolve(Some("y".repeat(64)), false).unwrap();
        assert_eq!(secret.as_bytes(), "y".repeat(64).as_bytes());
        env::remove_var(ENV_VAR);
    }

    #[test]
    fn short_secret_is_rejected_by_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        let err = Secret::resolve(Some("short".to_string()), false).unwrap_err();
        assert!(matches!(err, ReceiptError::SecretTooShort { .. }));
    }

    #[test]
    fn short_secret_is_allowed_when_waived() {
        let _guard = ENV_LOCK.lock().unwrap();
        let secret = Secret::resolve(Some("short".to_string()), true).unwrap();
        assert_eq!(secret.as_bytes(), b"short");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var(ENV_VAR);
        let err = Secret::resolve(None, true).unwrap_err();
        assert!(matches!(err, ReceiptError::MissingSecret));
    }
}
