/// Canonical DAG-CBOR encoding for PLC operations
///
/// Documents are first lowered to a `serde_cbor::Value` tree. Its maps are
/// `BTreeMap<Value, Value>` whose ordering is the RFC 7049 canonical order
/// (shorter keys first, then bytewise), which is exactly the DAG-CBOR key
/// order. Lengths and integers are written in their shortest form.
use crate::{
    error::{PlcError, PlcResult},
    operation::SignedOperation,
};
use libipld::{multihash::MultihashGeneric, Cid};
use serde::Serialize;
use serde_cbor::Value;
use sha2::{Digest, Sha256};

/// Multicodec for DAG-CBOR
pub const DAG_CBOR_CODEC: u64 = 0x71;

/// Multihash code for sha2-256
const SHA2_256_CODE: u64 = 0x12;

/// Serialize a document to canonical DAG-CBOR bytes
pub fn serialize<T: Serialize>(document: &T) -> PlcResult<Vec<u8>> {
    let value = serde_cbor::value::to_value(document)
        .map_err(|e| PlcError::Encoding(format!("Failed to lower document: {}", e)))?;

    ensure_representable(&value)?;

    serde_cbor::to_vec(&value)
        .map_err(|e| PlcError::Encoding(format!("Failed to encode DAG-CBOR: {}", e)))
}

/// Reject values DAG-CBOR has no canonical form for
fn ensure_representable(value: &Value) -> PlcResult<()> {
    match value {
        Value::Null | Value::Bool(_) | Value::Text(_) | Value::Bytes(_) => Ok(()),
        Value::Integer(n) => {
            // major types 0 and 1 cover -2^64 ..= 2^64 - 1
            if *n > u64::MAX as i128 || *n < -(u64::MAX as i128) - 1 {
                Err(PlcError::Encoding(format!("integer {} out of range", n)))
            } else {
                Ok(())
            }
        }
        // serde_cbor shortens floats, DAG-CBOR requires 64-bit ones
        Value::Float(f) => Err(PlcError::Encoding(format!(
            "float {} has no place in a PLC operation",
            f
        ))),
        Value::Array(items) => items.iter().try_for_each(ensure_representable),
        Value::Map(entries) => entries.iter().try_for_each(|(key, value)| match key {
            Value::Text(_) => ensure_representable(value),
            other => Err(PlcError::Encoding(format!(
                "map keys must be strings, got {:?}",
                other
            ))),
        }),
        Value::Tag(tag, _) => Err(PlcError::Encoding(format!(
            "unexpected CBOR tag {}",
            tag
        ))),
        other => Err(PlcError::Encoding(format!(
            "unsupported value {:?}",
            other
        ))),
    }
}

/// CIDv1 (dag-cbor, sha2-256) of already-encoded bytes
pub fn cid_for_bytes(bytes: &[u8]) -> PlcResult<Cid> {
    let digest = Sha256::digest(bytes);
    let multihash = MultihashGeneric::<64>::wrap(SHA2_256_CODE, &digest)
        .map_err(|e| PlcError::Encoding(format!("Failed to build multihash: {}", e)))?;

    Ok(Cid::new_v1(DAG_CBOR_CODEC, multihash))
}

/// CID of a signed operation, the value a following operation carries in `prev`
pub fn operation_cid(operation: &SignedOperation) -> PlcResult<String> {
    let bytes = serialize(operation)?;
    Ok(cid_for_bytes(&bytes)?.to_string())
}
