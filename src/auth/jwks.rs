//! Signing-key discovery and session-token verification.
//!
//! The verifier fetches the issuer's JSON Web Key Set on demand, keeps a
//! small count- and time-bounded cache of decoded keys, and validates the
//! token signature and issuer claim. Every failure mode rejects the
//! request; there is no fallback path.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::config::IdentityConfig;

use super::Claims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token has no key id")]
    MissingKeyId,
    #[error("no signing key matches kid {0}")]
    UnknownKey(String),
    #[error("key endpoint unreachable: {0}")]
    KeyFetch(String),
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),
    #[error("token rejected: {0}")]
    Rejected(String),
}

struct CachedKey {
    key: DecodingKey,
    algorithm: Algorithm,
    inserted_at: Instant,
}

/// Count- and time-bounded cache of decoded signing keys, keyed by `kid`.
///
/// Read by every verification call, written only on miss. Capacity and TTL
/// come from configuration; defaults mirror the issuer client's settings
/// (5 entries, 10 minutes).
pub struct KeyCache {
    max_entries: usize,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedKey>>,
}

impl KeyCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            max_entries,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, kid: &str) -> Option<(DecodingKey, Algorithm)> {
        {
            let entries = self.entries.read().expect("key cache poisoned");
            match entries.get(kid) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some((entry.key.clone(), entry.algorithm));
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry expired; drop it so the next fetch repopulates.
        let mut entries = self.entries.write().expect("key cache poisoned");
        entries.remove(kid);
        None
    }

    pub fn insert(&self, kid: String, key: DecodingKey, algorithm: Algorithm) {
        let mut entries = self.entries.write().expect("key cache poisoned");
        if entries.len() >= self.max_entries && !entries.contains_key(&kid) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            kid,
            CachedKey {
                key,
                algorithm,
                inserted_at: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().expect("key cache poisoned").len()
    }
}

/// Verifies bearer tokens against the issuer's published key set.
pub struct JwksVerifier {
    jwks_url: String,
    issuer: String,
    http: reqwest::Client,
    cache: KeyCache,
}

impl JwksVerifier {
    pub fn new(identity: &IdentityConfig, http: reqwest::Client) -> Self {
        Self {
            jwks_url: identity.jwks_url.clone(),
            issuer: identity.issuer.clone(),
            http,
            cache: KeyCache::new(
                identity.key_cache_max_entries,
                Duration::from_secs(identity.key_cache_ttl_secs),
            ),
        }
    }

    /// Verify signature and issuer claim, returning the decoded claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let (key, algorithm) = match self.cache.get(&kid) {
            Some(cached) => cached,
            None => self.fetch_key(&kid).await?,
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AuthError::Rejected(e.to_string()))?;
        Ok(data.claims)
    }

    async fn fetch_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        tracing::debug!(kid = %kid, url = %self.jwks_url, "fetching signing keys");

        let jwks: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let jwk = jwks
            .find(kid)
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?;

        let key =
            DecodingKey::from_jwk(jwk).map_err(|e| AuthError::UnsupportedKey(e.to_string()))?;

        // The algorithm comes from the key itself, so RSA production keys
        // and symmetric test keys verify through the same path.
        let key_alg = jwk
            .common
            .key_algorithm
            .ok_or_else(|| AuthError::UnsupportedKey("key declares no algorithm".to_string()))?;
        let algorithm = Algorithm::from_str(&key_alg.to_string())
            .map_err(|e| AuthError::UnsupportedKey(e.to_string()))?;

        self.cache.insert(kid.to_string(), key.clone(), algorithm);
        Ok((key, algorithm))
    }
}
