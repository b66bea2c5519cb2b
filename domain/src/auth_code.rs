//! Single-use intermediary auth codes.
//!
//! After a provider confirms an identity, the gateway issues a short-lived
//! opaque code bound to an `(identifier, provider)` pair. The client trades
//! that code for the actual JWT session pair, which decouples the provider's
//! redirect handshake from token issuance.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::{invalid_auth_code, Error};
use crate::provider::Provider;
use crate::Id;

/// A single-use code awaiting redemption.
#[derive(Debug, Clone)]
pub struct AuthCode {
    pub id: Id,
    pub value: String,
    pub identifier: String,
    pub provider: Provider,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// In-memory store of pending auth codes with expiration.
///
/// Redemption is delete-on-read under one lock acquisition, so two requests
/// presenting the same code race to exactly one success. Expired entries are
/// removed lazily on lookup; there is no background sweep.
#[derive(Clone)]
pub struct AuthCodeStore {
    codes: Arc<Mutex<HashMap<String, AuthCode>>>,
    ttl: Duration,
}

impl AuthCodeStore {
    /// Create a new store with the default TTL of 5 minutes.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(5))
    }

    /// Create a new store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            codes: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh code bound to `(identifier, provider)`.
    ///
    /// The value carries 256 bits of entropy; on the (negligible) chance of a
    /// collision with a pending code, a new value is generated.
    pub fn issue(&self, identifier: &str, provider: Provider) -> String {
        let mut codes = self.codes.lock().unwrap();
        loop {
            let value = Self::generate_value();
            match codes.entry(value.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(entry) => {
                    let issued_at = Utc::now();
                    entry.insert(AuthCode {
                        id: Id::new_v4(),
                        value: value.clone(),
                        identifier: identifier.to_string(),
                        provider,
                        issued_at,
                        expires_at: issued_at + self.ttl,
                    });
                    return value;
                }
            }
        }
    }

    /// Redeem a code, deleting it in the same critical section.
    ///
    /// Missing, already-consumed, expired and wrong-provider lookups all
    /// return the same error so the caller learns nothing about which codes
    /// exist.
    pub fn redeem(&self, value: &str, provider: Provider) -> Result<AuthCode, Error> {
        let mut codes = self.codes.lock().unwrap();
        match codes.entry(value.to_string()) {
            Entry::Occupied(entry) if entry.get().provider == provider => {
                let code = entry.remove();
                if Utc::now() > code.expires_at {
                    Err(invalid_auth_code())
                } else {
                    Ok(code)
                }
            }
            _ => Err(invalid_auth_code()),
        }
    }

    /// Remove a pending code by id. Idempotent; removing a code that was
    /// already redeemed (or never existed) is a no-op.
    pub fn clear(&self, id: Id) {
        let mut codes = self.codes.lock().unwrap();
        codes.retain(|_, code| code.id != id);
    }

    /// Number of pending (not yet redeemed) codes, including expired ones
    /// not yet swept by a lookup.
    pub fn pending(&self) -> usize {
        self.codes.lock().unwrap().len()
    }

    /// Generate a cryptographically random code value.
    fn generate_value() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }
}

impl Default for AuthCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthErrorKind, DomainErrorKind};

    fn assert_invalid_code(err: Error) {
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::InvalidAuthCode)
        );
    }

    #[test]
    fn test_issue_generates_distinct_opaque_values() {
        let store = AuthCodeStore::new();
        let first = store.issue("a@b.com", Provider::Google);
        let second = store.issue("a@b.com", Provider::Google);

        assert_eq!(first.len(), 64); // 32 bytes hex encoded
        assert_ne!(first, second);
        assert_eq!(store.pending(), 2);
    }

    #[test]
    fn test_redeem_returns_the_bound_identifier() {
        let store = AuthCodeStore::new();
        let value = store.issue("a@b.com", Provider::Google);

        let code = store.redeem(&value, Provider::Google).unwrap();
        assert_eq!(code.identifier, "a@b.com");
        assert_eq!(code.provider, Provider::Google);
    }

    #[test]
    fn test_code_consumed_after_redemption() {
        let store = AuthCodeStore::new();
        let value = store.issue("a@b.com", Provider::Google);

        store.redeem(&value, Provider::Google).unwrap();
        assert_invalid_code(store.redeem(&value, Provider::Google).unwrap_err());
    }

    #[test]
    fn test_redeem_unknown_code_fails() {
        let store = AuthCodeStore::new();
        assert_invalid_code(store.redeem("does-not-exist", Provider::Google).unwrap_err());
    }

    #[test]
    fn test_redeem_with_wrong_provider_fails() {
        let store = AuthCodeStore::new();
        let value = store.issue("a@b.com", Provider::Google);

        assert_invalid_code(store.redeem(&value, Provider::Supabase).unwrap_err());
    }

    #[test]
    fn test_expired_code_fails_even_if_never_redeemed() {
        let store = AuthCodeStore::with_ttl(Duration::seconds(-1));
        let value = store.issue("a@b.com", Provider::Google);

        assert_invalid_code(store.redeem(&value, Provider::Google).unwrap_err());
        // Swept lazily on the failed lookup.
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = AuthCodeStore::new();
        let value = store.issue("a@b.com", Provider::Google);
        let code = store.redeem(&value, Provider::Google).unwrap();

        store.clear(code.id);
        store.clear(code.id);
        assert_eq!(store.pending(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_redemption_yields_exactly_one_success() {
        let store = AuthCodeStore::new();
        let value = store.issue("a@b.com", Provider::Google);

        let (first, second) = {
            let store_a = store.clone();
            let store_b = store.clone();
            let value_a = value.clone();
            let value_b = value.clone();
            tokio::join!(
                tokio::spawn(async move { store_a.redeem(&value_a, Provider::Google) }),
                tokio::spawn(async move { store_b.redeem(&value_b, Provider::Google) }),
            )
        };

        let outcomes = [first.unwrap(), second.unwrap()];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one concurrent redeem may succeed");
    }
}
