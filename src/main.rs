/// PLC Genesis - create and register a did:plc identifier
///
/// Configuration comes from the environment (see `GenesisConfig::from_env`).
use anyhow::Context;
use plc_genesis::{
    artifacts::ArtifactStore,
    config::{GenesisConfig, LogFormat},
    create_genesis, DirectoryClient, PlcSigner, RotationKey, SubmissionOutcome,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GenesisConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config);

    // Load or generate the rotation key
    let key = match &config.operation.rotation_key_pem {
        Some(path) => {
            let pem = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let key = RotationKey::from_pkcs8_pem(&pem)?;
            tracing::info!("Loaded {} rotation key from {}", key.curve(), path.display());
            key
        }
        None => RotationKey::generate(config.operation.curve),
    };
    tracing::debug!(
        "Compressed public key: {}",
        hex::encode(key.compressed_public_key())
    );

    // Build, sign and derive
    let signer = PlcSigner::new(key.clone());
    let genesis = create_genesis(
        &signer,
        config.operation.also_known_as.clone(),
        config.operation.pds_endpoint.clone(),
    )?;

    // Persist keys and artifacts
    let store = ArtifactStore::new(&config.storage.out_dir).await?;
    let written = store.write_all(&key, &genesis).await?;

    println!("Rotation key (did:key): {}", key.did_key());
    println!("DID (derived):          {}", genesis.did);
    println!("Wrote keys & artifacts to: {}", store.base_path().display());

    if config.directory.dry_run {
        println!("Dry run selected; not POSTing to PLC.");
        return Ok(());
    }

    let client = DirectoryClient::new(&config.directory.url, config.directory.timeout())?;
    match client.submit(&genesis.did, &genesis.signed).await? {
        SubmissionOutcome::Submitted { status, body } => {
            println!("POST {} -> {}", client.operation_url(&genesis.did), status);
            println!("{}", body);
            println!("Registration appears successful.");
            Ok(())
        }
        SubmissionOutcome::Failed(failure) => {
            eprintln!("Registration failed: {}", failure);
            eprintln!(
                "{} is still valid; resubmit {} to retry.",
                genesis.did,
                written.operation.signed_operation.display()
            );
            std::process::exit(2);
        }
    }
}

fn init_logging(config: &GenesisConfig) {
    let default_filter = if config.logging.verbose {
        "plc_genesis=debug"
    } else {
        "plc_genesis=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}
