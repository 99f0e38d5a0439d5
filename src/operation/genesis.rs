/// Genesis operation pipeline
///
/// build -> serialize -> sign -> re-serialize with `sig` -> derive the DID.
/// The DID is `did:plc:` followed by the first 24 characters of the
/// lowercase, unpadded base32 SHA-256 of the signed operation's DAG-CBOR.
use crate::{
    crypto::{decode_signature, signer, PlcSigner, RotationPublicKey},
    error::{PlcError, PlcResult},
    operation::{build_genesis, codec, SignedOperation, UnsignedOperation, PLC_OPERATION_TYPE},
};
use sha2::{Digest, Sha256};

pub const DID_PLC_PREFIX: &str = "did:plc:";

/// Length of the method-specific part of a did:plc
pub const DID_PLC_SUFFIX_LEN: usize = 24;

/// Everything produced for one genesis registration
#[derive(Debug, Clone)]
pub struct GenesisOperation {
    /// Canonical bytes of the unsigned operation (the signed payload)
    pub unsigned_bytes: Vec<u8>,
    pub signed: SignedOperation,
    /// Derived `did:plc:...`
    pub did: String,
    /// CID of the signed operation
    pub cid: String,
}

impl GenesisOperation {
    pub fn unsigned(&self) -> &UnsignedOperation {
        self.signed.unsigned()
    }
}

/// Sign an unsigned operation
///
/// The signature covers the canonical encoding of `operation`, which has no
/// `sig` field.
pub fn sign_operation(
    signer: &PlcSigner,
    operation: UnsignedOperation,
) -> PlcResult<SignedOperation> {
    let bytes = codec::serialize(&operation)?;
    let sig = signer.sign_encoded(&bytes)?;
    Ok(operation.with_signature(sig))
}

/// Derive the did:plc identifier of a signed genesis operation
pub fn derive_did(operation: &SignedOperation) -> PlcResult<String> {
    let bytes = codec::serialize(operation)?;
    Ok(derive_did_from_bytes(&bytes))
}

/// Derive a did:plc from the canonical bytes of a signed operation
pub fn derive_did_from_bytes(signed_bytes: &[u8]) -> String {
    let digest = Sha256::digest(signed_bytes);
    let encoded = base32::encode(base32::Alphabet::Rfc4648Lower { padding: false }, &digest);
    format!("{}{}", DID_PLC_PREFIX, &encoded[..DID_PLC_SUFFIX_LEN])
}

/// Check that `did` has the shape of a derived did:plc
pub fn validate_plc_did(did: &str) -> PlcResult<()> {
    let suffix = did
        .strip_prefix(DID_PLC_PREFIX)
        .ok_or_else(|| PlcError::InvalidDid(format!("Expected a did:plc: identifier, got: {}", did)))?;

    let well_formed = suffix.len() == DID_PLC_SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b));

    if !well_formed {
        return Err(PlcError::InvalidDid(format!(
            "did:plc suffix must be {} base32 characters: {}",
            DID_PLC_SUFFIX_LEN, did
        )));
    }

    Ok(())
}

/// Build, sign and derive a genesis operation for the signer's key
///
/// The signer's key is the only rotation key.
pub fn create_genesis(
    signer: &PlcSigner,
    also_known_as: Vec<String>,
    pds_endpoint: Option<String>,
) -> PlcResult<GenesisOperation> {
    let unsigned = build_genesis(vec![signer.did_key()], also_known_as, pds_endpoint);
    create_genesis_from(signer, unsigned)
}

/// Sign and derive an already-built genesis operation
pub fn create_genesis_from(
    signer: &PlcSigner,
    unsigned: UnsignedOperation,
) -> PlcResult<GenesisOperation> {
    if !unsigned.is_genesis() {
        return Err(PlcError::Encoding(
            "genesis operation must have a null prev".to_string(),
        ));
    }

    let unsigned_bytes = codec::serialize(&unsigned)?;
    tracing::debug!("Encoded unsigned operation: {} bytes", unsigned_bytes.len());

    let sig = signer.sign_encoded(&unsigned_bytes)?;
    let signed = unsigned.with_signature(sig);

    let signed_bytes = codec::serialize(&signed)?;
    let did = derive_did_from_bytes(&signed_bytes);
    let cid = codec::cid_for_bytes(&signed_bytes)?.to_string();

    tracing::debug!(
        "SHA-256 of signed operation: {}",
        hex::encode(Sha256::digest(&signed_bytes))
    );
    tracing::info!("Derived {} (operation {})", did, cid);

    Ok(GenesisOperation {
        unsigned_bytes,
        signed,
        did,
        cid,
    })
}

/// Check a signed genesis operation
///
/// Requires `type == "plc_operation"`, a null `prev`, and a `sig` that
/// verifies over the unsigned encoding against one of the rotation keys.
pub fn verify_genesis(operation: &SignedOperation) -> PlcResult<()> {
    let unsigned = operation.unsigned();

    if unsigned.op_type != PLC_OPERATION_TYPE {
        return Err(PlcError::InvalidSignature(format!(
            "Invalid operation type '{}', expected '{}'",
            unsigned.op_type, PLC_OPERATION_TYPE
        )));
    }

    if !unsigned.is_genesis() {
        return Err(PlcError::InvalidSignature(
            "Genesis operation must have a null prev".to_string(),
        ));
    }

    let raw = decode_signature(&operation.sig)?;
    let bytes = codec::serialize(unsigned)?;

    for did_key in &unsigned.rotation_keys {
        let public_key = match RotationPublicKey::from_did_key(did_key) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Skipping unusable rotation key {}: {}", did_key, e);
                continue;
            }
        };

        if signer::verify(&public_key, &bytes, &raw).is_ok() {
            return Ok(());
        }
    }

    Err(PlcError::InvalidSignature(
        "Signature does not match any rotation key".to_string(),
    ))
}
