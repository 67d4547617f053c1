//! The signed artifact passed between generation, reading, and
//! verification.

use crate::error::Result;
use crate::payload::Payload;

/// Public-data text plus the signature bound to its rendered matrix.
///
/// `public_data` is the exact padded string carried by the data layer.
/// Verification re-encodes this string, so it is stored verbatim and the
/// structured fields are parsed out on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedBarcode {
    public_data: String,
    signature: Vec<u8>,
}

impl AuthenticatedBarcode {
    pub fn new(public_data: impl Into<String>, signature: Vec<u8>) -> Self {
        Self {
            public_data: public_data.into(),
            signature,
        }
    }

    /// The padded public-data string exactly as encoded in the data layer.
    pub fn public_data(&self) -> &str {
        &self.public_data
    }

    /// Raw signature bytes carried by the signature layer.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Parse the structured payload out of the public data.
    pub fn payload(&self) -> Result<Payload> {
        Payload::parse(&self.public_data)
    }

    /// Copy with the public data replaced.
    ///
    /// Barcodes are immutable; deliberately inconsistent instances for
    /// tamper tests are built through these reconstructors instead.
    pub fn with_public_data(&self, public_data: impl Into<String>) -> Self {
        Self {
            public_data: public_data.into(),
            signature: self.signature.clone(),
        }
    }

    /// Copy with the signature replaced.
    pub fn with_signature(&self, signature: Vec<u8>) -> Self {
        Self {
            public_data: self.public_data.clone(),
            signature,
        }
    }

    /// The public identifier, or `None` when the payload does not parse.
    pub fn identifier(&self) -> Option<String> {
        self.payload().ok().map(|p| p.identifier)
    }

    /// The embedded secret, or `None` when the payload does not parse.
    ///
    /// An empty secret is `Some("")`; only unparseable public data yields
    /// `None`.
    pub fn secret(&self) -> Option<String> {
        self.payload().ok().map(|p| p.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_return_stored_values() {
        let barcode = AuthenticatedBarcode::new("text", vec![1, 2, 3]);
        assert_eq!(barcode.public_data(), "text");
        assert_eq!(barcode.signature(), &[1, 2, 3]);
    }

    #[test]
    fn test_secret_extraction_from_padded_payload() {
        let payload = Payload::new("Product-42", "hidden");
        let padded = format!("{}    ", payload.encoded().unwrap());
        let barcode = AuthenticatedBarcode::new(padded, vec![]);
        assert_eq!(barcode.identifier().as_deref(), Some("Product-42"));
        assert_eq!(barcode.secret().as_deref(), Some("hidden"));
    }

    #[test]
    fn test_empty_secret_is_some_empty() {
        let payload = Payload::new("Product-42", "");
        let barcode = AuthenticatedBarcode::new(payload.encoded().unwrap(), vec![]);
        assert_eq!(barcode.secret().as_deref(), Some(""));
    }

    #[test]
    fn test_reconstructors_replace_one_field() {
        let barcode = AuthenticatedBarcode::new("text", vec![1, 2, 3]);

        let other_data = barcode.with_public_data("texU");
        assert_eq!(other_data.public_data(), "texU");
        assert_eq!(other_data.signature(), barcode.signature());

        let other_sig = barcode.with_signature(vec![9]);
        assert_eq!(other_sig.public_data(), barcode.public_data());
        assert_eq!(other_sig.signature(), &[9]);
    }

    #[test]
    fn test_unstructured_data_yields_no_secret() {
        let barcode = AuthenticatedBarcode::new("just some text", vec![]);
        assert!(barcode.payload().is_err());
        assert_eq!(barcode.secret(), None);
        assert_eq!(barcode.identifier(), None);
    }
}
