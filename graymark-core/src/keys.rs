//! Key material loading, generation, and on-disk layout.
//!
//! Two kinds of key material drive the signing layer:
//!
//! - a 32-byte symmetric master key, stored raw in `secret.key`;
//! - an ECDSA P-256 key pair, stored as PKCS#8 / SPKI PEM in `private.pem`
//!   and `public.pem`.
//!
//! [`KeyMaterial::load`] sniffs the file content, so callers hand over a
//! single path and get whichever capability the file grants: a PEM private
//! key signs and verifies, a PEM public key only verifies, a raw master key
//! does both through HMAC.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{GraymarkError, Result};

/// Length of the symmetric master key in bytes.
pub const MASTER_KEY_LEN: usize = 32;

/// Default file name for the raw symmetric master key.
pub const SYMMETRIC_KEY_FILE: &str = "secret.key";
/// Default file name for the PKCS#8 PEM private key.
pub const PRIVATE_KEY_FILE: &str = "private.pem";
/// Default file name for the SPKI PEM public key.
pub const PUBLIC_KEY_FILE: &str = "public.pem";

/// 32-byte symmetric master key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; MASTER_KEY_LEN]);

impl MasterKey {
    /// Generate a fresh random master key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; MASTER_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap raw key bytes, rejecting any length other than 32.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; MASTER_KEY_LEN] = bytes.try_into().map_err(|_| {
            GraymarkError::KeyStore(format!(
                "symmetric key must be exactly {MASTER_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Loaded key material, shaped by what the source file contained.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Raw 32-byte master key for the HMAC scheme.
    Symmetric(MasterKey),
    /// ECDSA P-256 key pair; `signing` is absent when only the public
    /// key was loaded.
    Asymmetric {
        signing: Option<SigningKey>,
        verifying: VerifyingKey,
    },
}

impl KeyMaterial {
    /// Load key material from a file, detecting its format.
    ///
    /// PEM content (`-----BEGIN`) is tried as a PKCS#8 private key first,
    /// then as an SPKI public key. Raw content must be exactly 32 bytes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path)?;

        if raw.starts_with(b"-----BEGIN") {
            let pem = std::str::from_utf8(&raw).map_err(|_| {
                GraymarkError::KeyStore(format!("{} is not valid UTF-8 PEM", path.display()))
            })?;
            let material = Self::from_pem(pem)?;
            tracing::debug!(
                path = %path.display(),
                can_sign = material.can_sign(),
                "Loaded PEM key material"
            );
            return Ok(material);
        }

        if raw.len() == MASTER_KEY_LEN {
            tracing::debug!(path = %path.display(), "Loaded symmetric master key");
            return Ok(Self::Symmetric(MasterKey::from_bytes(&raw)?));
        }

        Err(GraymarkError::KeyStore(format!(
            "unrecognized key file {} ({} bytes; expected PEM or {} raw bytes)",
            path.display(),
            raw.len(),
            MASTER_KEY_LEN
        )))
    }

    /// Parse PEM text as a private key, falling back to a public key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        if let Ok(signing) = SigningKey::from_pkcs8_pem(pem) {
            let verifying = VerifyingKey::from(&signing);
            return Ok(Self::Asymmetric {
                signing: Some(signing),
                verifying,
            });
        }
        match VerifyingKey::from_public_key_pem(pem) {
            Ok(verifying) => Ok(Self::Asymmetric {
                signing: None,
                verifying,
            }),
            Err(e) => Err(GraymarkError::KeyStore(format!(
                "PEM is neither a P-256 private nor public key: {e}"
            ))),
        }
    }

    /// Whether this material can produce signatures.
    pub fn can_sign(&self) -> bool {
        match self {
            Self::Symmetric(_) => true,
            Self::Asymmetric { signing, .. } => signing.is_some(),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symmetric(_) => f.write_str("KeyMaterial::Symmetric(..)"),
            Self::Asymmetric { signing, .. } => f
                .debug_struct("KeyMaterial::Asymmetric")
                .field("signing", &signing.is_some())
                .finish(),
        }
    }
}

/// Directory-backed key store using the standard file names.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn symmetric_key_path(&self) -> PathBuf {
        self.dir.join(SYMMETRIC_KEY_FILE)
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE)
    }

    /// Load the symmetric master key, generating and persisting one if the
    /// store has none yet.
    pub fn load_or_create_master(&self) -> Result<MasterKey> {
        let path = self.symmetric_key_path();
        if path.exists() {
            return MasterKey::from_bytes(&fs::read(&path)?);
        }

        fs::create_dir_all(&self.dir)?;
        let key = MasterKey::generate();
        fs::write(&path, key.as_bytes())?;
        tracing::info!(path = %path.display(), "Created new symmetric master key");
        Ok(key)
    }

    /// Load the symmetric master key, failing if the store has none.
    pub fn load_master(&self) -> Result<MasterKey> {
        let path = self.symmetric_key_path();
        if !path.exists() {
            return Err(GraymarkError::KeyStore(format!(
                "no symmetric key at {}",
                path.display()
            )));
        }
        MasterKey::from_bytes(&fs::read(&path)?)
    }

    /// Generate and persist a fresh symmetric master key.
    ///
    /// Refuses to overwrite an existing key unless `force` is set.
    pub fn generate_master(&self, force: bool) -> Result<PathBuf> {
        let path = self.symmetric_key_path();
        if path.exists() && !force {
            return Err(GraymarkError::KeyStore(format!(
                "refusing to overwrite existing key {}",
                path.display()
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let key = MasterKey::generate();
        fs::write(&path, key.as_bytes())?;
        tracing::info!(path = %path.display(), "Wrote symmetric master key");
        Ok(path)
    }

    /// Generate and persist an ECDSA P-256 key pair as PEM files.
    ///
    /// Refuses to overwrite existing key files unless `force` is set.
    /// Returns the private and public key paths.
    pub fn generate_keypair(&self, force: bool) -> Result<(PathBuf, PathBuf)> {
        let private_path = self.private_key_path();
        let public_path = self.public_key_path();
        if !force && (private_path.exists() || public_path.exists()) {
            return Err(GraymarkError::KeyStore(format!(
                "refusing to overwrite existing key pair in {}",
                self.dir.display()
            )));
        }

        fs::create_dir_all(&self.dir)?;
        let signing = SigningKey::random(&mut OsRng);
        let private_pem = signing
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| GraymarkError::KeyStore(format!("private key encoding failed: {e}")))?;
        let public_pem = VerifyingKey::from(&signing)
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| GraymarkError::KeyStore(format!("public key encoding failed: {e}")))?;

        fs::write(&private_path, private_pem.as_bytes())?;
        fs::write(&public_path, public_pem.as_bytes())?;
        tracing::info!(
            private = %private_path.display(),
            public = %public_path.display(),
            "Wrote ECDSA P-256 key pair"
        );
        Ok((private_path, public_path))
    }
}
