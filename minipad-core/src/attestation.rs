//! Attestation payload types.
//!
//! The attestation service itself is external; these types describe what is
//! sent to it and what comes back.

use crate::{ClaimId, Fid, Idea, IdeaId, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of attestation schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaKind {
    Idea,
    Remix,
    Claim,
    Completion,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        SchemaKind::Idea,
        SchemaKind::Remix,
        SchemaKind::Claim,
        SchemaKind::Completion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Idea => "IDEA",
            SchemaKind::Remix => "REMIX",
            SchemaKind::Claim => "CLAIM",
            SchemaKind::Completion => "COMPLETION",
        }
    }

    /// Field layout registered for this schema.
    pub fn definition(&self) -> &'static str {
        match self {
            SchemaKind::Idea => {
                "string title, string description, string author, string authorFid, string ideaId, uint256 timestamp"
            }
            SchemaKind::Remix => {
                "string title, string description, string remixer, string remixerFid, string originalIdeaId, string remixId, uint256 timestamp"
            }
            SchemaKind::Claim => "string ideaId, string claimer, string claimerFid, uint256 timestamp",
            SchemaKind::Completion => {
                "string ideaId, string claimer, string miniappUrl, string claimerFid, uint256 timestamp"
            }
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields submitted for one attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationPayload {
    pub kind: SchemaKind,
    pub fields: BTreeMap<String, String>,
}

impl AttestationPayload {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    /// Payload for a newly submitted idea.
    pub fn for_idea(idea: &Idea) -> Self {
        Self::new(SchemaKind::Idea)
            .with_field("title", &idea.title)
            .with_field("description", &idea.description)
            .with_field("author", &idea.author)
            .with_field("authorFid", fid_field(idea.author_fid))
            .with_field("ideaId", idea.idea_id)
            .with_field("timestamp", idea.timestamp.timestamp_millis())
    }

    /// Payload for a remix; `remix.original_idea_id` must be set.
    pub fn for_remix(remix: &Idea) -> Self {
        let original = remix
            .original_idea_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        Self::new(SchemaKind::Remix)
            .with_field("title", &remix.title)
            .with_field("description", &remix.description)
            .with_field("remixer", &remix.author)
            .with_field("remixerFid", fid_field(remix.author_fid))
            .with_field("originalIdeaId", original)
            .with_field("remixId", remix.idea_id)
            .with_field("timestamp", remix.timestamp.timestamp_millis())
    }

    pub fn for_claim(
        idea_id: IdeaId,
        claim_id: ClaimId,
        claimer: &str,
        claimer_fid: Option<Fid>,
        at: Timestamp,
    ) -> Self {
        Self::new(SchemaKind::Claim)
            .with_field("ideaId", idea_id)
            .with_field("claimId", claim_id)
            .with_field("claimer", claimer)
            .with_field("claimerFid", fid_field(claimer_fid))
            .with_field("timestamp", at.timestamp_millis())
    }

    pub fn for_completion(
        idea_id: IdeaId,
        claimer: &str,
        miniapp_url: &str,
        claimer_fid: Option<Fid>,
        at: Timestamp,
    ) -> Self {
        Self::new(SchemaKind::Completion)
            .with_field("ideaId", idea_id)
            .with_field("claimer", claimer)
            .with_field("miniappUrl", miniapp_url)
            .with_field("claimerFid", fid_field(claimer_fid))
            .with_field("timestamp", at.timestamp_millis())
    }

    /// SHA-256 over the kind and the sorted fields, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.kind.as_str().as_bytes());
        for (name, value) in &self.fields {
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
            hasher.update([b'=']);
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

fn fid_field(fid: Option<Fid>) -> String {
    fid.map(|f| f.to_string()).unwrap_or_default()
}

/// Result of a successful attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AttestationReceipt {
    pub uid: String,
    pub kind: SchemaKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_field_sensitive() {
        let a = AttestationPayload::new(SchemaKind::Claim).with_field("ideaId", "1");
        let b = AttestationPayload::new(SchemaKind::Claim).with_field("ideaId", "1");
        let c = AttestationPayload::new(SchemaKind::Claim).with_field("ideaId", "2");
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn test_digest_depends_on_kind() {
        let claim = AttestationPayload::new(SchemaKind::Claim).with_field("x", "1");
        let completion = AttestationPayload::new(SchemaKind::Completion).with_field("x", "1");
        assert_ne!(claim.digest(), completion.digest());
    }

    #[test]
    fn test_schema_kind_wire_names() {
        assert_eq!(serde_json::to_string(&SchemaKind::Completion).unwrap(), "\"COMPLETION\"");
        assert!(SchemaKind::Remix.definition().contains("originalIdeaId"));
    }
}
