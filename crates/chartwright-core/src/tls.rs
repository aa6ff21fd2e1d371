//! TLS certificate / private key validation
//!
//! Validation never fails with an `Err`: problems are collected into
//! [`TlsValidation::errors`] so a caller can show every applicable problem at
//! once. The checks run in a fixed order:
//!
//! 1. Both inputs blank: valid, no material (TLS is optional).
//! 2. Incomplete pair: certificate without key, or key without certificate.
//! 3. PEM envelopes: certificate and key are checked independently.
//! 4. Any error so far: return the accumulated errors only.
//! 5. Parse the first certificate block as X.509 and extract its validity window.
//!    A parse failure replaces everything with a single [`TlsError::ParseFailed`].

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CoreError, Result};

static CERTIFICATE_PEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-----BEGIN CERTIFICATE-----[\s\S]+?-----END CERTIFICATE-----")
        .expect("valid regex")
});

static PRIVATE_KEY_PEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"-----BEGIN (?:RSA |EC |ENCRYPTED )?PRIVATE KEY-----[\s\S]+?-----END (?:RSA |EC |ENCRYPTED )?PRIVATE KEY-----",
    )
    .expect("valid regex")
});

/// A problem with supplied TLS material
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsError {
    #[error("private key is required when a certificate is provided")]
    KeyRequired,

    #[error("certificate is required when a private key is provided")]
    CertificateRequired,

    #[error("certificate must be PEM-encoded")]
    CertificateNotPem,

    #[error("private key must be PEM-encoded")]
    KeyNotPem,

    #[error("failed to parse certificate")]
    ParseFailed,
}

impl TlsError {
    /// Stable code string for machine consumers
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyRequired => "key_required",
            Self::CertificateRequired => "certificate_required",
            Self::CertificateNotPem => "certificate_not_pem",
            Self::KeyNotPem => "key_not_pem",
            Self::ParseFailed => "parse_failed",
        }
    }
}

/// Outcome of validating a certificate / key pair.
///
/// Either all optional fields are `None` (no material, or invalid material
/// when `errors` is non-empty) or all are `Some` with `errors` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsValidation {
    /// Trimmed certificate text, as supplied (may contain a chain)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_pem: Option<String>,

    /// Trimmed private key text, as supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pem: Option<String>,

    /// Start of the leaf certificate's validity window (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,

    /// End of the leaf certificate's validity window (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    #[serde(default)]
    pub errors: Vec<TlsError>,
}

impl TlsValidation {
    fn invalid(errors: Vec<TlsError>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }

    /// No errors (material may or may not be present)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Valid and carrying a certificate / key pair
    pub fn has_material(&self) -> bool {
        self.is_valid() && self.certificate_pem.is_some()
    }

    /// Whether the certificate's validity window has ended at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .is_some_and(|expiry| expiry.with_timezone(&Utc) <= now)
    }

    /// Error messages, in the order they were found
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Validate a certificate / private key pair supplied as PEM text
pub fn validate(certificate: &str, key: &str) -> TlsValidation {
    let certificate = certificate.trim();
    let key = key.trim();

    if certificate.is_empty() && key.is_empty() {
        return TlsValidation::default();
    }

    let mut errors = Vec::new();

    if !certificate.is_empty() && key.is_empty() {
        errors.push(TlsError::KeyRequired);
    }
    if certificate.is_empty() && !key.is_empty() {
        errors.push(TlsError::CertificateRequired);
    }
    if !certificate.is_empty() && !CERTIFICATE_PEM.is_match(certificate) {
        errors.push(TlsError::CertificateNotPem);
    }
    if !key.is_empty() && !PRIVATE_KEY_PEM.is_match(key) {
        errors.push(TlsError::KeyNotPem);
    }

    if !errors.is_empty() {
        return TlsValidation::invalid(errors);
    }

    // The envelope check above guarantees a match
    let leaf = match CERTIFICATE_PEM.find(certificate) {
        Some(m) => m.as_str(),
        None => return TlsValidation::invalid(vec![TlsError::CertificateNotPem]),
    };

    match validity_window(leaf) {
        Ok((not_before, expires_at)) => TlsValidation {
            certificate_pem: Some(certificate.to_string()),
            key_pem: Some(key.to_string()),
            not_before: Some(not_before),
            expires_at: Some(expires_at),
            errors: Vec::new(),
        },
        Err(e) => {
            tracing::debug!("certificate rejected: {}", e);
            TlsValidation::invalid(vec![TlsError::ParseFailed])
        }
    }
}

/// Parse a single PEM certificate block and render its validity window
fn validity_window(block: &str) -> Result<(String, String)> {
    let pem = pem::parse(block).map_err(|e| CoreError::CertificateParse {
        message: format!("invalid PEM: {}", e),
    })?;

    let (_, cert) = x509_parser::parse_x509_certificate(pem.contents()).map_err(|e| {
        CoreError::CertificateParse {
            message: format!("invalid X.509 certificate: {}", e),
        }
    })?;

    let validity = cert.validity();
    Ok((
        iso8601(validity.not_before.timestamp())?,
        iso8601(validity.not_after.timestamp())?,
    ))
}

fn iso8601(timestamp: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| CoreError::CertificateParse {
            message: format!("timestamp out of range: {}", timestamp),
        })
}
