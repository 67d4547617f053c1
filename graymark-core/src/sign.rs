//! Visual-binding signatures over payload text and module matrix.
//!
//! Every signature commits to the rendered data layer, not just its text:
//! the matrix fingerprint is a SHA-256 digest of the canonical module bytes,
//! so re-encoding the same text with a different mask, version, or quiet
//! zone changes the fingerprint and the signature no longer verifies.
//!
//! Two schemes share one interface:
//!
//! - **HMAC-SHA256**: a per-barcode session key is derived by cyclically
//!   XOR-folding the master key with the fingerprint, then the payload text
//!   is MACed under that session key. Binding is transitive through the key.
//! - **ECDSA P-256**: the payload text concatenated with the fingerprint is
//!   signed directly. Signatures use the fixed 64-byte `r || s` form.

use hmac::{Hmac, Mac};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::Signature;
use sha2::{Digest, Sha256};

use crate::error::{GraymarkError, Result};
use crate::keys::KeyMaterial;
use crate::matrix::ModuleMatrix;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of an HMAC-SHA256 signature.
pub const HMAC_SIGNATURE_LEN: usize = 32;
/// Length in bytes of an ECDSA P-256 signature in `r || s` form.
pub const ECDSA_SIGNATURE_LEN: usize = 64;

/// SHA-256 digest of the matrix's canonical serialization.
///
/// The quiet zone is part of the canonical bytes, so the fingerprint covers
/// the symbol exactly as rendered.
pub fn matrix_fingerprint(matrix: &ModuleMatrix) -> [u8; 32] {
    Sha256::digest(matrix.to_canonical_bytes()).into()
}

/// Cyclic XOR fold of two non-empty byte strings.
///
/// Output length is the longer of the two inputs; each position XORs the
/// inputs indexed modulo their own lengths.
pub fn fold_session_key(master: &[u8], fingerprint: &[u8]) -> Vec<u8> {
    debug_assert!(!master.is_empty() && !fingerprint.is_empty());
    let len = master.len().max(fingerprint.len());
    (0..len)
        .map(|i| master[i % master.len()] ^ fingerprint[i % fingerprint.len()])
        .collect()
}

/// Signing and verification capability over loaded [`KeyMaterial`].
///
/// The scheme is selected by the material's shape: a symmetric master key
/// drives HMAC, an asymmetric key pair drives ECDSA.
#[derive(Debug, Clone)]
pub struct SignatureScheme {
    keys: KeyMaterial,
}

impl SignatureScheme {
    pub fn new(keys: KeyMaterial) -> Self {
        Self { keys }
    }

    /// Short stable name for logs and CLI output.
    pub fn name(&self) -> &'static str {
        match &self.keys {
            KeyMaterial::Symmetric(_) => "hmac-sha256",
            KeyMaterial::Asymmetric { .. } => "ecdsa-p256",
        }
    }

    /// Exact signature length this scheme produces, known before signing.
    ///
    /// The generator probes the signature layer's QR version with a
    /// stand-in of this length, so it must match the real output exactly.
    pub fn signature_len(&self) -> usize {
        match &self.keys {
            KeyMaterial::Symmetric(_) => HMAC_SIGNATURE_LEN,
            KeyMaterial::Asymmetric { .. } => ECDSA_SIGNATURE_LEN,
        }
    }

    /// Whether this scheme holds the private material needed to sign.
    pub fn can_sign(&self) -> bool {
        self.keys.can_sign()
    }

    /// Sign `public_text` bound to the rendered `matrix`.
    pub fn sign(&self, public_text: &str, matrix: &ModuleMatrix) -> Result<Vec<u8>> {
        let fingerprint = matrix_fingerprint(matrix);
        match &self.keys {
            KeyMaterial::Symmetric(master) => {
                let session = fold_session_key(master.as_bytes(), &fingerprint);
                let mut mac = HmacSha256::new_from_slice(&session)
                    .map_err(|e| GraymarkError::Signature(format!("HMAC init failed: {e}")))?;
                mac.update(public_text.as_bytes());
                Ok(mac.finalize().into_bytes().to_vec())
            }
            KeyMaterial::Asymmetric { signing, .. } => {
                let signing = signing
                    .as_ref()
                    .ok_or(GraymarkError::MissingKey { role: "private" })?;
                let message = bound_message(public_text, &fingerprint);
                let signature: Signature = signing
                    .try_sign(&message)
                    .map_err(|e| GraymarkError::Signature(format!("ECDSA signing failed: {e}")))?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// Check `signature` against `public_text` and the rendered `matrix`.
    ///
    /// Returns `Ok(false)` for any authenticity failure, including
    /// malformed signature bytes. `Err` is reserved for missing key
    /// material and internal faults.
    pub fn verify(&self, public_text: &str, matrix: &ModuleMatrix, signature: &[u8]) -> Result<bool> {
        let fingerprint = matrix_fingerprint(matrix);
        match &self.keys {
            KeyMaterial::Symmetric(master) => {
                let session = fold_session_key(master.as_bytes(), &fingerprint);
                let mut mac = HmacSha256::new_from_slice(&session)
                    .map_err(|e| GraymarkError::Signature(format!("HMAC init failed: {e}")))?;
                mac.update(public_text.as_bytes());
                Ok(mac.verify_slice(signature).is_ok())
            }
            KeyMaterial::Asymmetric { verifying, .. } => {
                let Ok(signature) = Signature::from_slice(signature) else {
                    return Ok(false);
                };
                let message = bound_message(public_text, &fingerprint);
                Ok(verifying.verify(&message, &signature).is_ok())
            }
        }
    }
}

/// Payload bytes concatenated with the matrix fingerprint.
fn bound_message(public_text: &str, fingerprint: &[u8; 32]) -> Vec<u8> {
    let mut message = Vec::with_capacity(public_text.len() + fingerprint.len());
    message.extend_from_slice(public_text.as_bytes());
    message.extend_from_slice(fingerprint);
    message
}
