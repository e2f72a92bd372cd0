use std::fmt::{Debug, Formatter};
use std::sync::Mutex;

use ec2sign_core::hash::{hex_sha256, hmac_sha256};
use ec2sign_core::utils::Redact;
use ec2sign_core::Error;

use crate::constants::{KEY_PREFIX, TERMINATOR};
use crate::{Credential, SigningContext};

/// Signing key derived from the secret access key.
///
/// Only valid for the date, region and service it was derived for.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Derive the signing key for the scope of `ctx`.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, dateStamp)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
pub fn derive_signing_key(secret: &str, ctx: &SigningContext) -> ec2sign_core::Result<SigningKey> {
    // Sign secret
    let secret = format!("{KEY_PREFIX}{secret}");
    // Sign date
    let sign_date = stage(secret.as_bytes(), ctx.date_stamp().as_bytes(), "date")?;
    // Sign region
    let sign_region = stage(&sign_date, ctx.region().as_bytes(), "region")?;
    // Sign service
    let sign_service = stage(&sign_region, ctx.service().as_bytes(), "service")?;
    // Sign request
    let sign_request = stage(&sign_service, TERMINATOR.as_bytes(), "request")?;

    Ok(SigningKey(sign_request))
}

fn stage(key: &[u8], content: &[u8], name: &str) -> ec2sign_core::Result<[u8; 32]> {
    hmac_sha256(key, content).map_err(|e| {
        Error::key_invalid(format!("failed to derive signing key at {name} stage")).with_source(e)
    })
}

/// Cache for the most recently derived signing key.
///
/// A signing key stays the same for a whole day, so callers signing many
/// requests can skip four HMAC rounds per request. Entries are keyed by
/// access key id, secret, date, region and service.
#[derive(Default)]
pub struct SigningKeyCache {
    inner: Mutex<Option<CacheEntry>>,
}

struct CacheEntry {
    access_key_id: String,
    scope: String,
    /// Digest of the secret, the secret itself is never kept.
    secret_digest: String,
    key: SigningKey,
}

impl SigningKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached key for this scope or derive and store a new one.
    pub fn get_or_derive(
        &self,
        cred: &Credential,
        ctx: &SigningContext,
    ) -> ec2sign_core::Result<SigningKey> {
        let scope = ctx.credential_scope();
        let secret_digest = hex_sha256(cred.secret_access_key.as_bytes());

        if let Some(entry) = self.inner.lock().expect("lock poisoned").as_ref() {
            if entry.access_key_id == cred.access_key_id
                && entry.scope == scope
                && entry.secret_digest == secret_digest
            {
                return Ok(entry.key.clone());
            }
        }

        let key = derive_signing_key(&cred.secret_access_key, ctx)?;
        *self.inner.lock().expect("lock poisoned") = Some(CacheEntry {
            access_key_id: cred.access_key_id.clone(),
            scope,
            secret_digest,
            key: key.clone(),
        });
        Ok(key)
    }

    /// Drop the cached key.
    pub fn clear(&self) {
        *self.inner.lock().expect("lock poisoned") = None;
    }
}

impl Debug for SigningKeyCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.lock().ok();
        let entry = guard.as_ref().and_then(|v| v.as_ref());
        f.debug_struct("SigningKeyCache")
            .field(
                "access_key_id",
                &entry.map(|v| Redact::from(&v.access_key_id)),
            )
            .field("scope", &entry.map(|v| v.scope.as_str()))
            .finish()
    }
}
