//! Basic-Auth credential gate.
//!
//! # Responsibilities
//! - Parse `Authorization: Basic` credentials from request headers
//! - Compare them against the configured pair in constant time
//!
//! # Design Decisions
//! - No configured pair means the gate is open
//! - Username and password are always both compared (no short-circuit)
//! - Credential values never reach the logs

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::{Choice, ConstantTimeEq};

use crate::config::Credentials;

/// Outcome of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Reject,
}

/// Stateless gate over an optional credential pair.
#[derive(Debug, Clone)]
pub struct CredentialGate {
    expected: Option<Credentials>,
    realm: String,
}

impl CredentialGate {
    pub fn new(expected: Option<Credentials>, realm: impl Into<String>) -> Self {
        Self {
            expected,
            realm: realm.into(),
        }
    }

    /// Whether a credential pair is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// Realm advertised in the `WWW-Authenticate` challenge.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn check(&self, supplied: Option<&Credentials>) -> Access {
        let Some(expected) = &self.expected else {
            return Access::Allow;
        };
        let Some(supplied) = supplied else {
            return Access::Reject;
        };

        let username = ct_str_eq(&supplied.username, &expected.username);
        let password = ct_str_eq(&supplied.password, &expected.password);

        if bool::from(username & password) {
            Access::Allow
        } else {
            Access::Reject
        }
    }
}

/// Constant-time string equality.
///
/// Both sides are padded to the longer length with different fill bytes so
/// that the comparison touches the same number of bytes whatever the inputs.
fn ct_str_eq(a: &str, b: &str) -> Choice {
    let len = a.len().max(b.len());

    let mut a_padded = vec![0u8; len];
    let mut b_padded = vec![0xFFu8; len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    a.len().ct_eq(&b.len()) & a_padded.ct_eq(&b_padded)
}

/// Extract credentials from an `Authorization: Basic <base64(user:pass)>` header.
///
/// Returns `None` for a missing header, a different scheme, bad base64,
/// non-UTF-8 content or a value without `:`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials::new(username, password))
}

/// `WWW-Authenticate` challenge value for `realm`.
pub fn challenge(realm: &str) -> String {
    format!("Basic realm=\"{}\"", realm.replace('"', "'"))
}
