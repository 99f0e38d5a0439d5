/// Cryptography module for PLC operations and key management
///
/// Handles rotation key generation, did:key encoding and low-S ECDSA signing
/// for DID:PLC operations on secp256k1 and P-256.

pub mod curve;
pub mod did_key;
pub mod keys;
pub mod signer;

pub use curve::{Curve, CurveParams};
pub use did_key::{decode_did_key, encode_did_key};
pub use keys::{RotationKey, RotationPublicKey};
pub use signer::{decode_signature, encode_signature, PlcSigner, RawSignature};
