//! Minipad Test Utilities
//!
//! Shared test infrastructure for the Minipad workspace:
//! - Proptest generators for ideas, claims and upvotes
//! - Collaborator doubles (attestation gateway, profile resolver)
//! - Fixtures for ideas in each lifecycle state
//! - Assertions for lifecycle and ledger invariants

pub use minipad_storage::{InMemoryStorage, StorageTrait};

pub use minipad_core::{
    Actor, AttestationGateway, AttestationPayload, AttestationReceipt, Claim, ClaimId,
    ClaimStatus, EntityIdType, EntityType, ErrorKind, ExternalServiceError, Fid, Idea, IdeaDraft,
    IdeaId, IdeaStatus, LifecycleError, MinipadError, MinipadResult, Profile, ProfileResolver,
    SchemaKind, StorageError, Timestamp, Upvote, ValidationError,
};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// COLLABORATOR DOUBLES
// ============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Attestation gateway that records every call and hands out sequential
/// uids (`0x...01`, `0x...02`, ...).
#[derive(Debug, Default)]
pub struct RecordingGateway {
    enabled: BTreeSet<SchemaKind>,
    next_uid: AtomicU64,
    attested: Mutex<Vec<AttestationPayload>>,
    revoked: Mutex<Vec<(String, SchemaKind)>>,
}

impl RecordingGateway {
    /// Gateway with every schema kind enabled.
    pub fn new() -> Self {
        Self::with_kinds(SchemaKind::ALL.iter().copied())
    }

    pub fn with_kinds(kinds: impl IntoIterator<Item = SchemaKind>) -> Self {
        Self {
            enabled: kinds.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Payloads attested so far, in call order.
    pub fn attested(&self) -> Vec<AttestationPayload> {
        lock(&self.attested).clone()
    }

    /// Uids revoked so far, in call order.
    pub fn revoked(&self) -> Vec<(String, SchemaKind)> {
        lock(&self.revoked).clone()
    }

    pub fn attested_kinds(&self) -> Vec<SchemaKind> {
        lock(&self.attested).iter().map(|p| p.kind).collect()
    }
}

#[async_trait]
impl AttestationGateway for RecordingGateway {
    async fn attest(&self, payload: &AttestationPayload) -> MinipadResult<AttestationReceipt> {
        if !self.is_enabled(payload.kind) {
            return Err(ExternalServiceError::SchemaNotConfigured { kind: payload.kind }.into());
        }
        let n = self.next_uid.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.attested).push(payload.clone());
        Ok(AttestationReceipt {
            uid: format!("0x{:064x}", n),
            kind: payload.kind,
        })
    }

    async fn revoke(&self, uid: &str, kind: SchemaKind) -> MinipadResult<()> {
        lock(&self.revoked).push((uid.to_string(), kind));
        Ok(())
    }

    fn is_enabled(&self, kind: SchemaKind) -> bool {
        self.enabled.contains(&kind)
    }
}

/// Gateway whose schemas are all enabled but every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGateway;

#[async_trait]
impl AttestationGateway for FailingGateway {
    async fn attest(&self, _payload: &AttestationPayload) -> MinipadResult<AttestationReceipt> {
        Err(ExternalServiceError::RequestFailed {
            service: "attestation".to_string(),
            reason: "connection refused".to_string(),
        }
        .into())
    }

    async fn revoke(&self, _uid: &str, _kind: SchemaKind) -> MinipadResult<()> {
        Err(ExternalServiceError::Timeout {
            service: "attestation".to_string(),
        }
        .into())
    }

    fn is_enabled(&self, _kind: SchemaKind) -> bool {
        true
    }
}

/// Profile resolver backed by a fixed table.
#[derive(Debug, Default)]
pub struct StaticProfileResolver {
    profiles: HashMap<Fid, Profile>,
    lookups: Mutex<Vec<Fid>>,
}

impl StaticProfileResolver {
    pub fn new(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.fid, p)).collect(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Fids looked up so far, in call order.
    pub fn lookups(&self) -> Vec<Fid> {
        lock(&self.lookups).clone()
    }
}

#[async_trait]
impl ProfileResolver for StaticProfileResolver {
    async fn resolve_profile(&self, fid: Fid) -> MinipadResult<Option<Profile>> {
        lock(&self.lookups).push(fid);
        Ok(self.profiles.get(&fid).cloned())
    }
}

/// Resolver for an identity provider that is down.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableResolver;

#[async_trait]
impl ProfileResolver for UnreachableResolver {
    async fn resolve_profile(&self, _fid: Fid) -> MinipadResult<Option<Profile>> {
        Err(ExternalServiceError::Timeout {
            service: "identity provider".to_string(),
        }
        .into())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Minipad entity types.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random IdeaId.
    pub fn arb_idea_id() -> impl Strategy<Value = IdeaId> {
        any::<[u8; 16]>().prop_map(|bytes| IdeaId::new(Uuid::from_bytes(bytes)))
    }

    /// Generate a wallet address like `0x1f3a...`.
    pub fn arb_wallet() -> impl Strategy<Value = String> {
        "0x[0-9a-f]{40}"
    }

    /// Generate one of `n` fixed wallets, so that generated actions collide.
    pub fn arb_wallet_from_pool(n: usize) -> impl Strategy<Value = String> {
        (0..n.max(1)).prop_map(|i| format!("0x{:040x}", i + 1))
    }

    pub fn arb_fid() -> impl Strategy<Value = Fid> {
        1u64..2_000_000
    }

    /// Non-blank title.
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,60}"
    }

    /// Non-blank description.
    pub fn arb_description() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 .,]{0,200}"
    }

    /// A string that is empty or whitespace only.
    pub fn arb_blank() -> impl Strategy<Value = String> {
        "[ \t\n]{0,5}"
    }

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_idea_status() -> impl Strategy<Value = IdeaStatus> {
        prop_oneof![
            Just(IdeaStatus::Open),
            Just(IdeaStatus::Claimed),
            Just(IdeaStatus::Completed),
        ]
    }

    pub fn arb_schema_kind() -> impl Strategy<Value = SchemaKind> {
        prop::sample::select(SchemaKind::ALL.to_vec())
    }

    /// Generate an IdeaDraft.
    pub fn arb_idea_draft() -> impl Strategy<Value = IdeaDraft> {
        (
            arb_title(),
            arb_description(),
            arb_wallet(),
            prop::option::of(arb_fid()),
        )
            .prop_map(|(title, description, author, fid)| IdeaDraft {
                title,
                description,
                author,
                profile: minipad_core::AuthorProfile {
                    fid,
                    ..Default::default()
                },
                attestation_uid: None,
            })
    }

    /// Generate an open, un-upvoted Idea.
    pub fn arb_idea() -> impl Strategy<Value = Idea> {
        (arb_idea_draft(), arb_timestamp())
            .prop_map(|(draft, timestamp)| Idea::from_draft(draft, timestamp))
    }

    /// Generate an Idea in a consistent state for `status`.
    pub fn arb_idea_in_status() -> impl Strategy<Value = Idea> {
        (arb_idea(), arb_idea_status(), arb_wallet()).prop_map(|(idea, status, claimer)| {
            match status {
                IdeaStatus::Open => idea,
                IdeaStatus::Claimed => fixtures::claim(idea, &claimer),
                IdeaStatus::Completed => {
                    fixtures::complete(fixtures::claim(idea, &claimer), "https://app.example")
                }
            }
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for ideas in each lifecycle state.

    use super::*;

    pub fn author() -> Actor {
        Actor::new("0x00000000000000000000000000000000000000a1")
    }

    pub fn builder() -> Actor {
        Actor::new("0x00000000000000000000000000000000000000b2").with_fid(4242)
    }

    pub fn voter(n: u8) -> Actor {
        Actor::new(format!("0x{:040x}", 0xc000 + n as u32))
    }

    pub fn draft(author: &str, title: &str) -> IdeaDraft {
        IdeaDraft {
            title: title.to_string(),
            description: format!("{} for Farcaster", title),
            author: author.to_string(),
            profile: Default::default(),
            attestation_uid: None,
        }
    }

    /// Open idea by [`author`].
    pub fn open_idea() -> Idea {
        Idea::from_draft(draft(&author().address, "Tip jar"), Utc::now())
    }

    /// Move `idea` into `claimed` by `claimer`, bypassing the rules engine.
    pub fn claim(mut idea: Idea, claimer: &str) -> Idea {
        idea.status = IdeaStatus::Claimed;
        idea.claimed_by = Some(claimer.to_string());
        idea.claimed_at = Some(idea.timestamp);
        idea
    }

    /// Move a claimed `idea` into `completed`, bypassing the rules engine.
    pub fn complete(mut idea: Idea, deployment_url: &str) -> Idea {
        idea.status = IdeaStatus::Completed;
        idea.completed_at = Some(idea.claimed_at.unwrap_or(idea.timestamp));
        idea.deployment_url = Some(deployment_url.to_string());
        idea
    }

    pub fn claimed_idea() -> Idea {
        claim(open_idea(), &builder().address)
    }

    pub fn completed_idea() -> Idea {
        complete(claimed_idea(), "https://tipjar.example")
    }

    /// Remix of `original` by `author`.
    pub fn remix_of(original: &Idea, author: &str) -> Idea {
        Idea::remix_of(original.idea_id, draft(author, "Tip jar for DAOs"), Utc::now())
    }

    pub fn profile(fid: Fid) -> Profile {
        Profile {
            fid,
            display_name: Some(format!("User {}", fid)),
            username: Some(format!("user{}", fid)),
            avatar_url: Some(format!("https://img.example/{}.png", fid)),
            bio: None,
            follower_count: 0,
            following_count: 0,
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for Minipad-specific invariants.

    use super::*;

    /// Assert that a MinipadResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &MinipadResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a MinipadResult failed with the given kind.
    #[track_caller]
    pub fn assert_error_kind<T: std::fmt::Debug>(result: &MinipadResult<T>, kind: ErrorKind) {
        match result {
            Err(e) => assert_eq!(e.kind(), kind, "Wrong error kind for {:?}", e),
            Ok(value) => panic!("Expected {:?} error, got Ok({:?})", kind, value),
        }
    }

    /// Assert that a MinipadResult is a NotFound error for `entity_type`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &MinipadResult<T>, entity_type: EntityType) {
        match result {
            Err(MinipadError::Storage(StorageError::NotFound { entity_type: et, .. })) => {
                assert_eq!(*et, entity_type, "Wrong entity type in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", entity_type, other),
        }
    }

    #[track_caller]
    pub fn assert_invalid_transition<T: std::fmt::Debug>(
        result: &MinipadResult<T>,
        from: IdeaStatus,
    ) {
        match result {
            Err(MinipadError::Lifecycle(LifecycleError::InvalidTransition { status, .. })) => {
                assert_eq!(*status, from, "Transition rejected from unexpected status");
            }
            other => panic!("Expected InvalidTransition from {:?}, got: {:?}", from, other),
        }
    }

    #[track_caller]
    pub fn assert_not_owner<T: std::fmt::Debug>(result: &MinipadResult<T>) {
        assert_error_kind(result, ErrorKind::NotOwner);
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &MinipadResult<T>) {
        assert_error_kind(result, ErrorKind::Validation);
    }

    /// Assert that an Idea has the expected status and consistent claim
    /// fields for it.
    #[track_caller]
    pub fn assert_idea_status(idea: &Idea, expected: IdeaStatus) {
        assert_eq!(
            idea.status, expected,
            "Idea status mismatch: expected {:?}, got {:?}",
            expected, idea.status
        );
        match expected {
            IdeaStatus::Open => {
                assert!(idea.claimed_by.is_none(), "Open idea should have no claimer");
                assert!(idea.claimed_at.is_none(), "Open idea should have no claimed_at");
            }
            IdeaStatus::Claimed => {
                assert!(idea.claimed_by.is_some(), "Claimed idea should have a claimer");
            }
            IdeaStatus::Completed => {
                assert!(idea.completed_at.is_some(), "Completed idea should have completed_at");
                assert!(idea.deployment_url.is_some(), "Completed idea should have a deployment url");
            }
        }
    }

    /// Assert that the idea's counter equals its number of upvote rows and
    /// that no voter appears twice.
    #[track_caller]
    pub fn assert_upvote_ledger_consistent(storage: &dyn StorageTrait, idea_id: IdeaId) {
        let idea = match storage.idea_get(idea_id) {
            Ok(Some(idea)) => idea,
            other => panic!("Expected idea {} to exist, got: {:?}", idea_id, other),
        };
        let rows = match storage.upvote_list_by_idea(idea_id) {
            Ok(rows) => rows,
            Err(e) => panic!("Failed to list upvotes: {:?}", e),
        };
        let voters: BTreeSet<&str> = rows.iter().map(|u| u.voter.as_str()).collect();
        assert_eq!(voters.len(), rows.len(), "A voter has more than one upvote row");
        assert_eq!(
            idea.upvotes,
            rows.len() as u64,
            "Counter {} disagrees with {} upvote rows",
            idea.upvotes,
            rows.len()
        );
    }

    /// Assert that nothing references `idea_id` anymore.
    #[track_caller]
    pub fn assert_no_orphans(storage: &dyn StorageTrait, idea_id: IdeaId) {
        assert!(
            matches!(storage.idea_get(idea_id), Ok(None)),
            "Idea {} still exists",
            idea_id
        );
        assert!(
            matches!(storage.upvote_list_by_idea(idea_id), Ok(rows) if rows.is_empty()),
            "Upvotes still reference {}",
            idea_id
        );
        assert!(
            matches!(storage.claim_list_by_idea(idea_id), Ok(rows) if rows.is_empty()),
            "Claims still reference {}",
            idea_id
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
