/// PLC operation documents
///
/// The in-memory shape of `plc_operation` documents plus a builder for
/// genesis operations. Canonical byte encoding lives in `codec`; signing and
/// identifier derivation in `genesis`.

pub mod codec;
pub mod genesis;

pub use codec::{operation_cid, serialize};
pub use genesis::{
    create_genesis, derive_did, derive_did_from_bytes, sign_operation, validate_plc_did,
    verify_genesis, GenesisOperation,
};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Value of the `type` field for regular operations
pub const PLC_OPERATION_TYPE: &str = "plc_operation";

/// Service entry name for the account's PDS
pub const ATPROTO_PDS_SERVICE: &str = "atproto_pds";

/// Service type for a PDS endpoint
pub const ATPROTO_PDS_TYPE: &str = "AtprotoPersonalDataServer";

/// Service endpoint declared by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    #[serde(rename = "type")]
    pub service_type: String,
    pub endpoint: String,
}

impl Service {
    pub fn atproto_pds(endpoint: impl Into<String>) -> Self {
        Self {
            service_type: ATPROTO_PDS_TYPE.to_string(),
            endpoint: endpoint.into(),
        }
    }
}

/// PLC operation without its signature
///
/// Parsing is strict: every field must be present (`prev` as `null` for
/// genesis) and unknown fields are rejected, so a parsed operation
/// re-encodes to the bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnsignedOperation {
    /// Operation type (always "plc_operation")
    #[serde(rename = "type")]
    pub op_type: String,

    /// did:key identifiers allowed to sign later operations, highest priority first
    pub rotation_keys: Vec<String>,

    /// Named verification keys (did:key values)
    pub verification_methods: BTreeMap<String, String>,

    /// Alternate identifiers, typically `at://` handles
    pub also_known_as: Vec<String>,

    /// Named service endpoints
    pub services: BTreeMap<String, Service>,

    /// CID of the previous operation; always serialized, `null` for genesis
    #[serde(deserialize_with = "nullable")]
    pub prev: Option<String>,
}

/// PLC operation with its `sig` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SignedOperationFields")]
pub struct SignedOperation {
    #[serde(flatten)]
    pub operation: UnsignedOperation,

    /// base64url (no padding) raw `r || s` signature over the unsigned bytes
    pub sig: String,
}

/// Wire form of a signed operation
///
/// `deny_unknown_fields` has no effect through `flatten`, so signed
/// documents are read field by field and then split.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SignedOperationFields {
    #[serde(rename = "type")]
    op_type: String,
    rotation_keys: Vec<String>,
    verification_methods: BTreeMap<String, String>,
    also_known_as: Vec<String>,
    services: BTreeMap<String, Service>,
    #[serde(deserialize_with = "nullable")]
    prev: Option<String>,
    sig: String,
}

impl From<SignedOperationFields> for SignedOperation {
    fn from(fields: SignedOperationFields) -> Self {
        UnsignedOperation {
            op_type: fields.op_type,
            rotation_keys: fields.rotation_keys,
            verification_methods: fields.verification_methods,
            also_known_as: fields.also_known_as,
            services: fields.services,
            prev: fields.prev,
        }
        .with_signature(fields.sig)
    }
}

/// `Option` that must be present in the input, possibly as `null`
fn nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl UnsignedOperation {
    /// Whether this operation starts a new identifier
    pub fn is_genesis(&self) -> bool {
        self.prev.is_none()
    }

    /// Attach a signature
    pub fn with_signature(self, sig: String) -> SignedOperation {
        SignedOperation {
            operation: self,
            sig,
        }
    }
}

impl SignedOperation {
    /// The operation with `sig` removed, i.e. the bytes that were signed
    pub fn unsigned(&self) -> &UnsignedOperation {
        &self.operation
    }
}

/// Builder for genesis operations
#[derive(Debug, Default)]
pub struct GenesisBuilder {
    rotation_keys: Vec<String>,
    also_known_as: Vec<String>,
    pds_endpoint: Option<String>,
}

impl GenesisBuilder {
    /// Create a new genesis operation builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rotation key (did:key); order sets precedence
    pub fn rotation_key(mut self, did_key: impl Into<String>) -> Self {
        self.rotation_keys.push(did_key.into());
        self
    }

    /// Set rotation keys
    pub fn rotation_keys(mut self, keys: Vec<String>) -> Self {
        self.rotation_keys = keys;
        self
    }

    /// Append an alsoKnownAs entry
    pub fn also_known_as(mut self, uri: impl Into<String>) -> Self {
        self.also_known_as.push(uri.into());
        self
    }

    /// Set all alsoKnownAs entries
    pub fn also_known_as_list(mut self, uris: Vec<String>) -> Self {
        self.also_known_as = uris;
        self
    }

    /// Declare the PDS endpoint; the URL is not validated
    pub fn pds_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.pds_endpoint = Some(endpoint.into());
        self
    }

    /// Build the operation (without signature)
    pub fn build(self) -> UnsignedOperation {
        build_genesis(self.rotation_keys, self.also_known_as, self.pds_endpoint)
    }
}

/// Assemble an unsigned genesis operation
///
/// `prev` is always null, `verificationMethods` always empty and `services`
/// holds `atproto_pds` only when a non-empty endpoint is given.
pub fn build_genesis(
    rotation_keys: Vec<String>,
    also_known_as: Vec<String>,
    pds_endpoint: Option<String>,
) -> UnsignedOperation {
    let mut services = BTreeMap::new();
    if let Some(endpoint) = pds_endpoint.filter(|endpoint| !endpoint.is_empty()) {
        services.insert(ATPROTO_PDS_SERVICE.to_string(), Service::atproto_pds(endpoint));
    }

    UnsignedOperation {
        op_type: PLC_OPERATION_TYPE.to_string(),
        rotation_keys,
        verification_methods: BTreeMap::new(),
        also_known_as,
        services,
        prev: None,
    }
}
