/// PLC directory client
///
/// Submits signed operations and reads back DID documents and audit logs.
/// Submission never retries; a failure leaves the signed operation and DID
/// valid for a later resubmission.
use crate::{
    error::{PlcError, PlcResult, SubmissionFailure},
    operation::{validate_plc_did, SignedOperation},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public PLC directory
pub const DEFAULT_DIRECTORY_URL: &str = "https://plc.directory";

/// Response bodies are cut to this many characters
pub const MAX_BODY_CHARS: usize = 5000;

/// Result of POSTing an operation to the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 2xx response
    Submitted { status: u16, body: String },
    /// Non-2xx response or transport failure
    Failed(SubmissionFailure),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted { .. })
    }

    /// Turn a failed outcome into `PlcError::Submission`
    pub fn into_result(self) -> PlcResult<(u16, String)> {
        match self {
            SubmissionOutcome::Submitted { status, body } => Ok((status, body)),
            SubmissionOutcome::Failed(failure) => Err(PlcError::Submission(failure)),
        }
    }
}

/// DID document as served by the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    pub id: String,
    #[serde(default)]
    pub also_known_as: Vec<String>,
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default)]
    pub service: Vec<DocumentService>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub controller: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentService {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: String,
}

/// One entry of `/<did>/log/audit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub did: String,
    /// Raw operation; older entries may use legacy shapes
    pub operation: serde_json::Value,
    pub cid: String,
    #[serde(default)]
    pub nullified: bool,
    pub created_at: DateTime<Utc>,
}

/// HTTP client for a PLC directory
#[derive(Clone)]
pub struct DirectoryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl DirectoryClient {
    /// Create a client for `base_url` with a bounded request timeout
    pub fn new(base_url: &str, timeout: Duration) -> PlcResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("plc-genesis/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PlcError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL an operation for `did` is POSTed to
    pub fn operation_url(&self, did: &str) -> String {
        format!("{}/{}", self.base_url, did)
    }

    /// Submit a signed operation
    ///
    /// Only a malformed DID is an `Err`; everything the network does is
    /// reported through the outcome.
    pub async fn submit(
        &self,
        did: &str,
        operation: &SignedOperation,
    ) -> PlcResult<SubmissionOutcome> {
        validate_plc_did(did)?;

        let url = self.operation_url(did);
        tracing::info!("POSTing operation to {}", url);

        let response = match self.http_client.post(&url).json(operation).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("PLC submission request failed: {}", e);
                return Ok(SubmissionOutcome::Failed(SubmissionFailure::Transport(
                    e.to_string(),
                )));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(text) => truncate_body(&text),
            Err(e) => format!("<unreadable body: {}>", e),
        };

        tracing::info!("POST {} -> {}", url, status.as_u16());

        if status.is_success() {
            Ok(SubmissionOutcome::Submitted {
                status: status.as_u16(),
                body,
            })
        } else {
            tracing::warn!("PLC directory rejected operation: {} {}", status, body);
            Ok(SubmissionOutcome::Failed(SubmissionFailure::Rejected {
                status: status.as_u16(),
                body,
            }))
        }
    }

    /// Fetch the current DID document
    pub async fn resolve_document(&self, did: &str) -> PlcResult<DidDocument> {
        validate_plc_did(did)?;
        self.get_json(&self.operation_url(did)).await
    }

    /// Fetch the full operation history, oldest first
    pub async fn audit_log(&self, did: &str) -> PlcResult<Vec<AuditEntry>> {
        validate_plc_did(did)?;
        self.get_json(&format!("{}/log/audit", self.operation_url(did)))
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> PlcResult<T> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| PlcError::Resolution(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(PlcError::Resolution(format!(
                "PLC directory returned {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PlcError::Resolution(format!("Invalid response from {}: {}", url, e)))
    }
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_BODY_CHARS).collect()
}
