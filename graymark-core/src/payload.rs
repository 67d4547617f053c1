//! Public payload codec.
//!
//! The data layer carries one minified JSON object `{"d":…,"s":…,"u":…}`:
//! identifier, optional secret, and a fresh v4 UUID nonce so two barcodes for
//! the same product never share a matrix. The encoding is injective and
//! self-delimiting, which keeps the trailing-space padding added for version
//! alignment outside the value and strippable without ambiguity.
//!
//! Version alignment: the signature layer's size is known ahead of signing
//! because every scheme has a fixed signature length, so the final version is
//! `max(V_data, V_sig)` and the payload text is padded with spaces until its
//! own required version matches.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SymbolConfig;
use crate::error::{GraymarkError, Result};
use crate::matrix;

/// Padding character appended for version alignment.
const PAD_CHAR: char = ' ';

/// Logical fields of the public data layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Public identifier, arbitrary UTF-8.
    #[serde(rename = "d")]
    pub identifier: String,
    /// Embedded secret message; empty is allowed.
    #[serde(rename = "s")]
    pub secret: String,
    /// Uniqueness nonce, freshly generated per barcode.
    #[serde(rename = "u")]
    pub nonce: Uuid,
}

impl Payload {
    /// New payload with a fresh uniqueness nonce.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            nonce: Uuid::new_v4(),
        }
    }

    /// Canonical minified serialization.
    pub fn encoded(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GraymarkError::PayloadParse(e.to_string()))
    }

    /// Parse a possibly padded public-data string back into its fields.
    pub fn parse(padded: &str) -> Result<Self> {
        serde_json::from_str(padded.trim())
            .map_err(|e| GraymarkError::PayloadParse(e.to_string()))
    }
}

/// Append padding until `text` itself requires exactly `target` versions.
///
/// The target must not be below the text's own requirement; that would be a
/// caller logic fault, not reachable through [`aligned_public_text`].
pub fn pad_to_version(mut text: String, target: u8, config: &SymbolConfig) -> Result<String> {
    let mut version = matrix::required_version(&text, config)?;
    if version > target {
        return Err(GraymarkError::PayloadTooLarge(format!(
            "payload requires version {version}, alignment target is {target}"
        )));
    }
    while version < target {
        text.push(PAD_CHAR);
        version = matrix::required_version(&text, config)?;
    }
    Ok(text)
}

/// Serialize `payload` and align it to the signature layer's version.
///
/// Returns the padded public-data string and the shared final version both
/// layers will be encoded at.
pub fn aligned_public_text(
    payload: &Payload,
    signature_len: usize,
    config: &SymbolConfig,
) -> Result<(String, u8)> {
    let text = payload.encoded()?;
    let data_version = matrix::required_version(&text, config)?;
    let sig_version = matrix::required_version(&signature_probe(signature_len), config)?;
    let final_version = data_version.max(sig_version);

    tracing::debug!(
        data_version,
        sig_version,
        final_version,
        "Aligned layer versions"
    );

    let padded = pad_to_version(text, final_version, config)?;
    Ok((padded, final_version))
}

/// Deterministic stand-in with the exact base64 length of a real signature.
///
/// Any byte content works: base64 of 32 or 64 bytes always carries `=`
/// padding, which pins the engine to byte mode exactly like a real signature.
fn signature_probe(signature_len: usize) -> String {
    STANDARD.encode(vec![0u8; signature_len])
}
