/// Local artifact storage for genesis registrations
///
/// Writes the rotation keypair and the genesis operation into one directory:
/// - `rotation_<curve>_private.pem` / `rotation_<curve>_public.pem`
/// - `genesis_unsigned.dag-cbor`
/// - `genesis_signed.json`
/// - `did.txt`, `rotation_did_key.txt`
use crate::{
    crypto::RotationKey,
    error::{PlcError, PlcResult},
    operation::GenesisOperation,
};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

pub const UNSIGNED_FILE: &str = "genesis_unsigned.dag-cbor";
pub const SIGNED_FILE: &str = "genesis_signed.json";
pub const DID_FILE: &str = "did.txt";
pub const DID_KEY_FILE: &str = "rotation_did_key.txt";

/// Paths of the operation files
#[derive(Debug, Clone)]
pub struct GenesisPaths {
    pub unsigned_operation: PathBuf,
    pub signed_operation: PathBuf,
    pub did: PathBuf,
}

/// Paths written for one registration
#[derive(Debug, Clone)]
pub struct WrittenArtifacts {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
    pub operation: GenesisPaths,
    pub did_key: PathBuf,
}

/// Artifact directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_path: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) an artifact directory
    pub async fn new(base_path: impl Into<PathBuf>) -> PlcResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            PlcError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create {}: {}", base_path.display(), e),
            ))
        })?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write the rotation keypair as PEM, returning (private, public) paths
    pub async fn write_key(&self, key: &RotationKey) -> PlcResult<(PathBuf, PathBuf)> {
        let curve = key.curve();
        let private_path = self
            .base_path
            .join(format!("rotation_{}_private.pem", curve));
        let public_path = self.base_path.join(format!("rotation_{}_public.pem", curve));

        write_private(&private_path, key.to_pkcs8_pem()?.as_bytes()).await?;
        fs::write(&public_path, key.public_key_pem()?).await?;

        tracing::debug!("Wrote {} keypair to {}", curve, self.base_path.display());
        Ok((private_path, public_path))
    }

    /// Write the operation artifacts
    pub async fn write_genesis(&self, genesis: &GenesisOperation) -> PlcResult<GenesisPaths> {
        let unsigned_operation = self.base_path.join(UNSIGNED_FILE);
        fs::write(&unsigned_operation, &genesis.unsigned_bytes).await?;
        tracing::debug!(
            "Wrote {} ({} bytes)",
            UNSIGNED_FILE,
            genesis.unsigned_bytes.len()
        );

        let signed_operation = self.base_path.join(SIGNED_FILE);
        let mut json = serde_json::to_string(&genesis.signed)?;
        json.push('\n');
        fs::write(&signed_operation, json).await?;
        tracing::debug!("Wrote {}", SIGNED_FILE);

        let did = self.base_path.join(DID_FILE);
        fs::write(&did, format!("{}\n", genesis.did)).await?;
        tracing::debug!("Wrote {}", DID_FILE);

        Ok(GenesisPaths {
            unsigned_operation,
            signed_operation,
            did,
        })
    }

    /// Write everything for a registration
    pub async fn write_all(
        &self,
        key: &RotationKey,
        genesis: &GenesisOperation,
    ) -> PlcResult<WrittenArtifacts> {
        let (private_key, public_key) = self.write_key(key).await?;
        let operation = self.write_genesis(genesis).await?;

        let did_key = self.base_path.join(DID_KEY_FILE);
        fs::write(&did_key, format!("{}\n", key.did_key())).await?;
        tracing::debug!("Wrote {}", DID_KEY_FILE);

        Ok(WrittenArtifacts {
            private_key,
            public_key,
            operation,
            did_key,
        })
    }
}

/// Write a file readable only by its owner where the platform allows it
async fn write_private(path: &Path, data: &[u8]) -> PlcResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    file.write_all(data).await?;
    file.flush().await?;
    Ok(())
}
