//! Property-based tests for the attestation gateways
//!
//! A gateway only serves the schema kinds it has a schema uid for; every
//! other kind fails with `SchemaNotConfigured` whatever the payload.

use std::collections::BTreeMap;

use minipad_api::providers::{DisabledGateway, MockGateway};
use minipad_core::{
    AttestationGateway, AttestationPayload, ExternalServiceError, MinipadError, SchemaKind,
};
use minipad_test_utils::generators::arb_schema_kind;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn is_unconfigured(err: &MinipadError, expected: SchemaKind) -> bool {
    matches!(
        err,
        MinipadError::External(ExternalServiceError::SchemaNotConfigured { kind }) if *kind == expected
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_mock_gateway_serves_only_configured_kind(
        configured in arb_schema_kind(),
        requested in arb_schema_kind(),
        field in "[a-z0-9]{1,16}",
    ) {
        runtime().block_on(async {
            let mut schemas = BTreeMap::new();
            schemas.insert(configured, format!("0xschema-{}", configured));
            let gateway = MockGateway::new(schemas);
            let payload = AttestationPayload::new(requested).with_field("ideaId", field);

            assert_eq!(gateway.is_enabled(requested), requested == configured);
            let attested = gateway.attest(&payload).await;
            let revoked = gateway.revoke("0x01", requested).await;
            if requested == configured {
                let receipt = attested.unwrap();
                assert_eq!(receipt.kind, requested);
                assert_eq!(receipt.uid.len(), 66);
                assert!(receipt.uid[2..].chars().all(|c| c.is_ascii_hexdigit()));
                assert!(revoked.is_ok());
            } else {
                assert!(is_unconfigured(&attested.unwrap_err(), requested));
                assert!(is_unconfigured(&revoked.unwrap_err(), requested));
            }
        });
    }

    #[test]
    fn prop_disabled_gateway_serves_nothing(kind in arb_schema_kind()) {
        runtime().block_on(async {
            let gateway = DisabledGateway;
            assert!(!gateway.is_enabled(kind));
            let attested = gateway.attest(&AttestationPayload::new(kind)).await;
            assert!(is_unconfigured(&attested.unwrap_err(), kind));
            let revoked = gateway.revoke("0x01", kind).await;
            assert!(is_unconfigured(&revoked.unwrap_err(), kind));
        });
    }
}
