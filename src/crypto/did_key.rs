/// did:key encoding for compressed rotation keys
///
/// `did:key:z<base58btc(multicodec || compressed point)>`
use crate::{
    crypto::{keys::COMPRESSED_KEY_LEN, Curve},
    error::{PlcError, PlcResult},
};

pub const DID_KEY_PREFIX: &str = "did:key:";

/// Multibase marker for base58btc
const BASE58BTC: char = 'z';

/// Encode a compressed public key as a did:key identifier
pub fn encode_did_key(curve: Curve, compressed: &[u8; COMPRESSED_KEY_LEN]) -> String {
    let mut payload = Vec::with_capacity(2 + COMPRESSED_KEY_LEN);
    payload.extend_from_slice(&curve.multicodec());
    payload.extend_from_slice(compressed);

    format!(
        "{}{}{}",
        DID_KEY_PREFIX,
        BASE58BTC,
        bs58::encode(payload).into_string()
    )
}

/// Recover the curve and compressed key bytes from a did:key identifier
///
/// Only checks the encoding; use `RotationPublicKey::from_did_key` to also
/// validate that the bytes are a point on the curve.
pub fn decode_did_key(did_key: &str) -> PlcResult<(Curve, [u8; COMPRESSED_KEY_LEN])> {
    let multibase = did_key
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| PlcError::InvalidDid(format!("not a did:key identifier: {}", did_key)))?;

    let encoded = multibase.strip_prefix(BASE58BTC).ok_or_else(|| {
        PlcError::InvalidDid(format!("did:key must use base58btc ('z') multibase: {}", did_key))
    })?;

    let payload = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| PlcError::InvalidDid(format!("invalid base58 in did:key: {}", e)))?;

    if payload.len() < 2 {
        return Err(PlcError::InvalidDid("did:key payload too short".to_string()));
    }

    let (prefix, key_bytes) = payload.split_at(2);
    let curve = Curve::from_multicodec(prefix)?;

    let compressed: [u8; COMPRESSED_KEY_LEN] = key_bytes.try_into().map_err(|_| {
        PlcError::InvalidKey(format!(
            "expected {} byte compressed key, got {}",
            COMPRESSED_KEY_LEN,
            key_bytes.len()
        ))
    })?;

    Ok((curve, compressed))
}
