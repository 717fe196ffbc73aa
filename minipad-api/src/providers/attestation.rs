//! Attestation gateways.

use async_trait::async_trait;
use minipad_core::{
    AttestationGateway, AttestationPayload, AttestationReceipt, ExternalServiceError,
    MinipadResult, SchemaKind,
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Gateway used when no attestation service is configured. Every kind
/// reports as disabled and any direct call fails with `SchemaNotConfigured`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl AttestationGateway for DisabledGateway {
    async fn attest(&self, payload: &AttestationPayload) -> MinipadResult<AttestationReceipt> {
        Err(ExternalServiceError::SchemaNotConfigured { kind: payload.kind }.into())
    }

    async fn revoke(&self, _uid: &str, kind: SchemaKind) -> MinipadResult<()> {
        Err(ExternalServiceError::SchemaNotConfigured { kind }.into())
    }

    fn is_enabled(&self, _kind: SchemaKind) -> bool {
        false
    }
}

/// Local gateway issuing deterministic uids.
///
/// The uid is `0x` followed by SHA-256 over the schema uid and the payload
/// digest, so the same payload under the same schema always yields the same
/// uid. Useful for staging and for exercising the attestation path end to end.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    schemas: BTreeMap<SchemaKind, String>,
}

impl MockGateway {
    pub fn new(schemas: BTreeMap<SchemaKind, String>) -> Self {
        Self { schemas }
    }

    fn schema_uid(&self, kind: SchemaKind) -> MinipadResult<&str> {
        self.schemas
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| ExternalServiceError::SchemaNotConfigured { kind }.into())
    }
}

#[async_trait]
impl AttestationGateway for MockGateway {
    async fn attest(&self, payload: &AttestationPayload) -> MinipadResult<AttestationReceipt> {
        let schema = self.schema_uid(payload.kind)?;
        let mut hasher = Sha256::new();
        hasher.update(schema.as_bytes());
        hasher.update(payload.digest().as_bytes());
        let uid = format!("0x{}", hex::encode(hasher.finalize()));

        tracing::debug!(kind = %payload.kind, uid = %uid, "Issued mock attestation");
        Ok(AttestationReceipt {
            uid,
            kind: payload.kind,
        })
    }

    async fn revoke(&self, uid: &str, kind: SchemaKind) -> MinipadResult<()> {
        self.schema_uid(kind)?;
        tracing::debug!(kind = %kind, uid = %uid, "Revoked mock attestation");
        Ok(())
    }

    fn is_enabled(&self, kind: SchemaKind) -> bool {
        self.schemas.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minipad_core::{ErrorKind, MinipadError};

    fn gateway() -> MockGateway {
        let mut schemas = BTreeMap::new();
        schemas.insert(SchemaKind::Idea, "0xschema-idea".to_string());
        MockGateway::new(schemas)
    }

    #[tokio::test]
    async fn test_disabled_gateway_reports_unconfigured() {
        let gateway = DisabledGateway;
        assert!(!gateway.is_enabled(SchemaKind::Claim));

        let err = gateway
            .attest(&AttestationPayload::new(SchemaKind::Claim))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MinipadError::External(ExternalServiceError::SchemaNotConfigured {
                kind: SchemaKind::Claim
            })
        ));
    }

    #[tokio::test]
    async fn test_mock_gateway_uids_are_deterministic() {
        let gateway = gateway();
        let payload = AttestationPayload::new(SchemaKind::Idea).with_field("ideaId", "1");

        let first = gateway.attest(&payload).await.unwrap();
        let second = gateway.attest(&payload).await.unwrap();
        assert_eq!(first, second);
        assert!(first.uid.starts_with("0x"));
        assert_eq!(first.uid.len(), 66);

        let other = gateway
            .attest(&AttestationPayload::new(SchemaKind::Idea).with_field("ideaId", "2"))
            .await
            .unwrap();
        assert_ne!(first.uid, other.uid);
    }

    #[tokio::test]
    async fn test_mock_gateway_rejects_unconfigured_kind() {
        let gateway = gateway();
        assert!(gateway.is_enabled(SchemaKind::Idea));
        assert!(!gateway.is_enabled(SchemaKind::Remix));

        let err = gateway
            .attest(&AttestationPayload::new(SchemaKind::Remix))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalServiceFailure);

        assert!(gateway.revoke("0x01", SchemaKind::Idea).await.is_ok());
        assert!(gateway.revoke("0x01", SchemaKind::Claim).await.is_err());
    }
}
