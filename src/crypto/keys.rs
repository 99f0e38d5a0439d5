/// Rotation key material for did:plc operations
///
/// Wraps secp256k1 and P-256 ECDSA keys behind one curve-tagged type so the
/// rest of the pipeline never has to match on the curve itself.
use crate::{
    crypto::{did_key, Curve},
    error::{PlcError, PlcResult},
};
use k256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;

/// Length of a SEC1 compressed point on either supported curve
pub const COMPRESSED_KEY_LEN: usize = 33;

/// Private rotation key on one of the supported curves
#[derive(Clone)]
pub enum RotationKey {
    K256(k256::ecdsa::SigningKey),
    P256(p256::ecdsa::SigningKey),
}

/// Public half of a rotation key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPublicKey {
    K256(k256::ecdsa::VerifyingKey),
    P256(p256::ecdsa::VerifyingKey),
}

impl RotationKey {
    /// Generate a fresh key from the operating system RNG
    pub fn generate(curve: Curve) -> Self {
        let key = match curve {
            Curve::K256 => RotationKey::K256(k256::ecdsa::SigningKey::random(&mut OsRng)),
            Curve::P256 => RotationKey::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
        };
        tracing::debug!("Generated {} rotation keypair {}", curve, key.did_key());
        key
    }

    /// Wrap an existing 32-byte big-endian secret scalar
    pub fn from_bytes(curve: Curve, secret: &[u8]) -> PlcResult<Self> {
        if secret.len() != 32 {
            return Err(PlcError::InvalidKey(format!(
                "private key must be exactly 32 bytes, got {}",
                secret.len()
            )));
        }

        match curve {
            Curve::K256 => k256::ecdsa::SigningKey::from_slice(secret)
                .map(RotationKey::K256)
                .map_err(|e| PlcError::InvalidKey(format!("invalid k256 private key: {}", e))),
            Curve::P256 => p256::ecdsa::SigningKey::from_slice(secret)
                .map(RotationKey::P256)
                .map_err(|e| PlcError::InvalidKey(format!("invalid p256 private key: {}", e))),
        }
    }

    /// Create a key from a hex-encoded secret scalar
    pub fn from_hex(curve: Curve, hex_key: &str) -> PlcResult<Self> {
        let key_bytes = hex::decode(hex_key.trim())
            .map_err(|e| PlcError::InvalidKey(format!("invalid hex private key: {}", e)))?;

        Self::from_bytes(curve, &key_bytes)
    }

    /// Load a PKCS#8 PEM private key, detecting the curve from its algorithm parameters
    pub fn from_pkcs8_pem(pem: &str) -> PlcResult<Self> {
        if let Ok(key) = k256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(RotationKey::K256(key));
        }

        p256::ecdsa::SigningKey::from_pkcs8_pem(pem)
            .map(RotationKey::P256)
            .map_err(|e| {
                PlcError::InvalidKey(format!(
                    "not a PKCS#8 secp256k1 or P-256 private key: {}",
                    e
                ))
            })
    }

    pub fn curve(&self) -> Curve {
        match self {
            RotationKey::K256(_) => Curve::K256,
            RotationKey::P256(_) => Curve::P256,
        }
    }

    pub fn public_key(&self) -> RotationPublicKey {
        match self {
            RotationKey::K256(key) => RotationPublicKey::K256(*key.verifying_key()),
            RotationKey::P256(key) => RotationPublicKey::P256(*key.verifying_key()),
        }
    }

    /// SEC1 compressed public key (33 bytes)
    pub fn compressed_public_key(&self) -> [u8; COMPRESSED_KEY_LEN] {
        self.public_key().compressed()
    }

    /// Public key as a did:key identifier
    pub fn did_key(&self) -> String {
        self.public_key().did_key()
    }

    /// Secret scalar, big-endian
    pub fn to_bytes(&self) -> [u8; 32] {
        match self {
            RotationKey::K256(key) => key.to_bytes().into(),
            RotationKey::P256(key) => key.to_bytes().into(),
        }
    }

    /// Private key as an unencrypted PKCS#8 PEM document
    pub fn to_pkcs8_pem(&self) -> PlcResult<String> {
        let pem = match self {
            RotationKey::K256(key) => key.to_pkcs8_pem(LineEnding::LF),
            RotationKey::P256(key) => key.to_pkcs8_pem(LineEnding::LF),
        }
        .map_err(|e| PlcError::InvalidKey(format!("failed to encode private key: {}", e)))?;

        Ok(pem.to_string())
    }

    /// Public key as a SubjectPublicKeyInfo PEM document
    pub fn public_key_pem(&self) -> PlcResult<String> {
        self.public_key().to_public_key_pem()
    }
}

impl std::fmt::Debug for RotationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the secret scalar
        f.debug_struct("RotationKey")
            .field("curve", &self.curve())
            .field("did_key", &self.did_key())
            .finish()
    }
}

impl RotationPublicKey {
    /// Parse a SEC1-encoded point (compressed or not) on the given curve
    pub fn from_sec1_bytes(curve: Curve, bytes: &[u8]) -> PlcResult<Self> {
        match curve {
            Curve::K256 => k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                .map(RotationPublicKey::K256)
                .map_err(|e| PlcError::InvalidKey(format!("invalid k256 public key: {}", e))),
            Curve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                .map(RotationPublicKey::P256)
                .map_err(|e| PlcError::InvalidKey(format!("invalid p256 public key: {}", e))),
        }
    }

    /// Parse a did:key identifier
    pub fn from_did_key(did_key: &str) -> PlcResult<Self> {
        let (curve, compressed) = did_key::decode_did_key(did_key)?;
        Self::from_sec1_bytes(curve, &compressed)
    }

    pub fn curve(&self) -> Curve {
        match self {
            RotationPublicKey::K256(_) => Curve::K256,
            RotationPublicKey::P256(_) => Curve::P256,
        }
    }

    /// SEC1 compressed point: parity byte followed by the X coordinate
    pub fn compressed(&self) -> [u8; COMPRESSED_KEY_LEN] {
        let mut out = [0u8; COMPRESSED_KEY_LEN];
        match self {
            RotationPublicKey::K256(key) => {
                out.copy_from_slice(key.to_encoded_point(true).as_bytes())
            }
            RotationPublicKey::P256(key) => {
                out.copy_from_slice(key.to_encoded_point(true).as_bytes())
            }
        }
        out
    }

    pub fn did_key(&self) -> String {
        did_key::encode_did_key(self.curve(), &self.compressed())
    }

    pub fn to_public_key_pem(&self) -> PlcResult<String> {
        let pem = match self {
            RotationPublicKey::K256(key) => key.to_public_key_pem(LineEnding::LF),
            RotationPublicKey::P256(key) => key.to_public_key_pem(LineEnding::LF),
        };

        pem.map_err(|e| PlcError::InvalidKey(format!("failed to encode public key: {}", e)))
    }
}
