//! Claim-related API types

use minipad_core::{Claim, CompletionDetails};
use serde::{Deserialize, Serialize};

use super::IdeaResponse;

/// Optional body of a claim request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClaimIdeaRequest {
    #[serde(default)]
    pub attestation_uid: Option<String>,
}

/// Request to mark a claimed idea completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompleteIdeaRequest {
    /// Where the finished miniapp is deployed
    pub deployment_url: String,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub completion_attestation_uid: Option<String>,
}

impl CompleteIdeaRequest {
    pub fn new(deployment_url: impl Into<String>) -> Self {
        Self {
            deployment_url: deployment_url.into(),
            github_url: None,
            completion_attestation_uid: None,
        }
    }

    pub fn details(&self) -> CompletionDetails {
        CompletionDetails {
            deployment_url: self.deployment_url.trim().to_string(),
            github_url: self
                .github_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            completion_attestation_uid: self.completion_attestation_uid.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClaimResponse {
    pub idea: IdeaResponse,
    pub claim: Claim,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnclaimResponse {
    pub idea: IdeaResponse,
    /// Attestation of the released claim, if one had been recorded
    pub attestation_uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompleteResponse {
    pub idea: IdeaResponse,
    /// The claim marked completed; absent for ideas claimed before claims
    /// were recorded
    pub claim: Option<Claim>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListClaimsResponse {
    pub claims: Vec<Claim>,
    pub total: usize,
}

impl From<Vec<Claim>> for ListClaimsResponse {
    fn from(claims: Vec<Claim>) -> Self {
        let total = claims.len();
        Self { claims, total }
    }
}
