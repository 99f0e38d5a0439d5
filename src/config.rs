/// Configuration management for genesis registration
use crate::{
    crypto::Curve,
    directory::DEFAULT_DIRECTORY_URL,
    error::{PlcError, PlcResult},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub operation: OperationConfig,
    pub storage: StorageConfig,
    pub directory: DirectoryConfig,
    pub logging: LoggingConfig,
}

/// What goes into the genesis operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    pub curve: Curve,
    /// alsoKnownAs entries in declaration order
    pub also_known_as: Vec<String>,
    pub pds_endpoint: Option<String>,
    /// Existing PKCS#8 PEM key to reuse instead of generating one
    pub rotation_key_pem: Option<PathBuf>,
}

/// Artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub out_dir: PathBuf,
}

/// Directory submission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub url: String,
    pub dry_run: bool,
    pub timeout_secs: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LogFormat,
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GenesisConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PlcResult<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> PlcResult<Self> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let curve: Curve = get("PLC_CURVE").unwrap_or("k256").parse()?;

        let also_known_as = get("PLC_ALSO_KNOWN_AS")
            .unwrap_or("")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();

        let pds_endpoint = get("PLC_PDS_ENDPOINT").map(str::to_string);
        let rotation_key_pem = get("PLC_ROTATION_KEY_PEM").map(PathBuf::from);

        let out_dir = PathBuf::from(get("PLC_OUT_DIR").unwrap_or("plc_keys"));

        let url = get("PLC_DIRECTORY_URL")
            .unwrap_or(DEFAULT_DIRECTORY_URL)
            .trim_end_matches('/')
            .to_string();
        let dry_run = parse_bool("PLC_DRY_RUN", get("PLC_DRY_RUN"))?;
        let timeout_secs = match get("PLC_SUBMIT_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| {
                PlcError::Config(format!("Invalid PLC_SUBMIT_TIMEOUT_SECS: {}", value))
            })?,
            None => 10,
        };
        if timeout_secs == 0 {
            return Err(PlcError::Config(
                "PLC_SUBMIT_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        let verbose = parse_bool("PLC_VERBOSE", get("PLC_VERBOSE"))?;
        let format = match get("PLC_LOG_FORMAT").map(str::to_ascii_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(PlcError::Config(format!(
                    "PLC_LOG_FORMAT must be 'text' or 'json', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            operation: OperationConfig {
                curve,
                also_known_as,
                pds_endpoint,
                rotation_key_pem,
            },
            storage: StorageConfig { out_dir },
            directory: DirectoryConfig {
                url,
                dry_run,
                timeout_secs,
            },
            logging: LoggingConfig { verbose, format },
        })
    }
}

fn parse_bool(name: &str, value: Option<&str>) -> PlcResult<bool> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(PlcError::Config(format!(
            "Invalid boolean for {}: {}",
            name, other
        ))),
    }
}
