/// PLC operation signing
///
/// Signatures are ECDSA over SHA-256 of the message, normalized to low-S and
/// carried as raw `r || s` (64 bytes, never DER), then base64url without
/// padding in the operation's `sig` field.
use crate::{
    crypto::{Curve, RotationKey, RotationPublicKey},
    error::{PlcError, PlcResult},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use sha2::{Digest, Sha256};

/// Length of a raw `r || s` signature
pub const RAW_SIGNATURE_LEN: usize = 64;

/// Raw `r || s`, each 32 bytes big-endian
pub type RawSignature = [u8; RAW_SIGNATURE_LEN];

/// Signs messages with a single rotation key
pub struct PlcSigner {
    key: RotationKey,
}

impl PlcSigner {
    pub fn new(key: RotationKey) -> Self {
        Self { key }
    }

    pub fn curve(&self) -> Curve {
        self.key.curve()
    }

    pub fn key(&self) -> &RotationKey {
        &self.key
    }

    /// did:key of the signing key
    pub fn did_key(&self) -> String {
        self.key.did_key()
    }

    /// Sign raw bytes, returning a low-S `r || s` signature
    pub fn sign(&self, message: &[u8]) -> PlcResult<RawSignature> {
        sign(self.curve(), &self.key, message)
    }

    /// Sign raw bytes and encode the signature for an operation's `sig` field
    pub fn sign_encoded(&self, message: &[u8]) -> PlcResult<String> {
        self.sign(message).map(|raw| encode_signature(&raw))
    }
}

/// Sign `message` with `key`, which must be on `curve`
pub fn sign(curve: Curve, key: &RotationKey, message: &[u8]) -> PlcResult<RawSignature> {
    if key.curve() != curve {
        return Err(PlcError::InvalidKey(format!(
            "expected a {} key, got {}",
            curve,
            key.curve()
        )));
    }

    let digest = Sha256::digest(message);
    let mut raw = [0u8; RAW_SIGNATURE_LEN];

    match key {
        RotationKey::K256(signing_key) => {
            let signature: k256::ecdsa::Signature = signing_key
                .sign_prehash(&digest)
                .map_err(|e| PlcError::InvalidKey(format!("k256 signing failed: {}", e)))?;
            raw.copy_from_slice(&signature.to_bytes());
        }
        RotationKey::P256(signing_key) => {
            let signature: p256::ecdsa::Signature = signing_key
                .sign_prehash(&digest)
                .map_err(|e| PlcError::InvalidKey(format!("p256 signing failed: {}", e)))?;
            raw.copy_from_slice(&signature.to_bytes());
        }
    }

    Ok(normalize_low_s(curve, raw))
}

/// Replace `s` with `n - s` when `s > n/2`
pub fn normalize_low_s(curve: Curve, mut raw: RawSignature) -> RawSignature {
    let params = curve.params();
    let mut s = [0u8; 32];
    s.copy_from_slice(&raw[32..]);

    // equal-length big-endian arrays order the same as the integers they encode
    if s > params.half_order {
        raw[32..].copy_from_slice(&sub_be(&params.order, &s));
    }
    raw
}

/// Whether the `s` half of a raw signature is at most n/2
pub fn is_low_s(curve: Curve, raw: &RawSignature) -> bool {
    raw[32..] <= curve.params().half_order[..]
}

/// a - b for 256-bit big-endian integers with a >= b
fn sub_be(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = a[i] as i16 - b[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    out
}

/// base64url, no padding
pub fn encode_signature(raw: &RawSignature) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

pub fn decode_signature(sig: &str) -> PlcResult<RawSignature> {
    let bytes = URL_SAFE_NO_PAD
        .decode(sig)
        .map_err(|e| PlcError::InvalidSignature(format!("signature is not base64url: {}", e)))?;

    bytes.as_slice().try_into().map_err(|_| {
        PlcError::InvalidSignature(format!(
            "signature must be {} bytes, got {}",
            RAW_SIGNATURE_LEN,
            bytes.len()
        ))
    })
}

/// Verify a raw low-S signature over `message`
pub fn verify(public_key: &RotationPublicKey, message: &[u8], raw: &RawSignature) -> PlcResult<()> {
    if !is_low_s(public_key.curve(), raw) {
        return Err(PlcError::InvalidSignature(
            "signature is not in low-S form".to_string(),
        ));
    }

    let digest = Sha256::digest(message);

    let verified = match public_key {
        RotationPublicKey::K256(verifying_key) => k256::ecdsa::Signature::from_slice(raw)
            .and_then(|signature| verifying_key.verify_prehash(&digest, &signature)),
        RotationPublicKey::P256(verifying_key) => p256::ecdsa::Signature::from_slice(raw)
            .and_then(|signature| verifying_key.verify_prehash(&digest, &signature)),
    };

    verified.map_err(|_| PlcError::InvalidSignature("signature verification failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_key(curve: Curve) -> RotationKey {
        RotationKey::from_bytes(curve, &[42u8; 32]).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        for curve in Curve::ALL {
            let signer = PlcSigner::new(fixed_key(curve));
            let raw = signer.sign(b"genesis").unwrap();

            assert!(verify(&signer.key().public_key(), b"genesis", &raw).is_ok());
        }
    }

    #[test]
    fn test_deterministic_signing() {
        let signer = PlcSigner::new(fixed_key(Curve::K256));

        let sig1 = signer.sign_encoded(b"same message").unwrap();
        let sig2 = signer.sign_encoded(b"same message").unwrap();

        // RFC 6979 nonces: identical inputs give identical signatures
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_curve_mismatch_is_invalid_key() {
        let key = fixed_key(Curve::K256);
        let err = sign(Curve::P256, &key, b"message").unwrap_err();
        assert!(matches!(err, PlcError::InvalidKey(_)));
    }

    #[test]
    fn test_signatures_are_low_s() {
        for curve in Curve::ALL {
            let key = RotationKey::generate(curve);
            for i in 0u32..64 {
                let raw = sign(curve, &key, &i.to_be_bytes()).unwrap();
                assert!(is_low_s(curve, &raw), "{} signature {} is high-S", curve, i);
            }
        }
    }

    #[test]
    fn test_normalize_matches_crate_normalization() {
        let key = fixed_key(Curve::P256);
        for i in 0u32..32 {
            let raw = sign(Curve::P256, &key, &i.to_be_bytes()).unwrap();
            let signature = p256::ecdsa::Signature::from_slice(&raw).unwrap();
            assert!(signature.normalize_s().is_none());
        }
    }

    #[test]
    fn test_normalize_boundary() {
        let curve = Curve::K256;
        let half = curve.params().half_order;

        // s == n/2 is already canonical
        let mut raw = [0u8; 64];
        raw[32..].copy_from_slice(&half);
        assert_eq!(normalize_low_s(curve, raw), raw);

        // s == n/2 + 1 maps to n - s == n/2
        let mut above = half;
        above[31] += 1;
        let mut raw = [0u8; 64];
        raw[32..].copy_from_slice(&above);
        let normalized = normalize_low_s(curve, raw);
        assert_eq!(&normalized[32..], &half[..]);
        assert_eq!(&normalized[..32], &[0u8; 32][..]);
    }

    #[test]
    fn test_high_s_rejected() {
        let curve = Curve::P256;
        let key = fixed_key(curve);
        let mut raw = sign(curve, &key, b"message").unwrap();

        let mut s = [0u8; 32];
        s.copy_from_slice(&raw[32..]);
        raw[32..].copy_from_slice(&sub_be(&curve.params().order, &s));

        let err = verify(&key.public_key(), b"message", &raw).unwrap_err();
        assert!(matches!(err, PlcError::InvalidSignature(_)));
    }

    #[test]
    fn test_tampered_message_rejected() {
        let key = fixed_key(Curve::K256);
        let raw = sign(Curve::K256, &key, b"original").unwrap();
        assert!(verify(&key.public_key(), b"tampered", &raw).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let key = fixed_key(Curve::K256);
        let other = RotationKey::from_bytes(Curve::K256, &[7u8; 32]).unwrap();
        let raw = sign(Curve::K256, &key, b"message").unwrap();
        assert!(verify(&other.public_key(), b"message", &raw).is_err());
    }

    #[test]
    fn test_signature_encoding() {
        let signer = PlcSigner::new(fixed_key(Curve::K256));
        let sig = signer.sign_encoded(b"message").unwrap();

        // 64 bytes -> 86 base64 chars without padding
        assert_eq!(sig.len(), 86);
        assert!(!sig.contains('='));
        assert!(!sig.contains('+') && !sig.contains('/'));

        let raw = decode_signature(&sig).unwrap();
        assert_eq!(encode_signature(&raw), sig);
    }

    #[test]
    fn test_decode_signature_wrong_length() {
        let short = URL_SAFE_NO_PAD.encode([1u8; 32]);
        let err = decode_signature(&short).unwrap_err();
        assert!(matches!(err, PlcError::InvalidSignature(_)));

        assert!(decode_signature("not/base64url+").is_err());
    }

    #[test]
    fn test_sub_be() {
        let mut a = [0u8; 32];
        a[30] = 1; // 256
        let mut b = [0u8; 32];
        b[31] = 1;
        let mut expected = [0u8; 32];
        expected[31] = 255;
        assert_eq!(sub_be(&a, &b), expected);
    }
}
