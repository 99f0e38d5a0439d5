/// PLC Genesis - did:plc identifier creation
///
/// Generates a rotation key, builds and signs a did:plc genesis operation,
/// derives its self-certifying identifier and submits it to a PLC directory.

pub mod artifacts;
pub mod config;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod operation;

pub use crypto::{Curve, PlcSigner, RotationKey, RotationPublicKey};
pub use directory::{DirectoryClient, SubmissionOutcome};
pub use error::{PlcError, PlcResult, SubmissionFailure};
pub use operation::{
    create_genesis, derive_did, verify_genesis, GenesisBuilder, GenesisOperation,
    SignedOperation, UnsignedOperation,
};
