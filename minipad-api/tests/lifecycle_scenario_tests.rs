//! End-to-end lifecycle tests against the service layer
//!
//! Drives `Minipad` with the in-memory store, a recording attestation
//! gateway and inline attestation dispatch, so every side effect is
//! visible when the call returns.

use std::sync::Arc;

use minipad_api::{
    AttestationDispatch, ChangeFeed, ClaimIdeaRequest, CompleteIdeaRequest, Minipad,
    MinipadEvent, SubmitIdeaRequest,
};
use minipad_core::{Actor, EntityType, IdeaStatus, SchemaKind};
use minipad_storage::{InMemoryStorage, StorageTrait};
use minipad_test_utils::assertions::*;
use minipad_test_utils::{fixtures, FailingGateway, RecordingGateway};
use tokio::sync::broadcast::error::TryRecvError;

struct Harness {
    minipad: Minipad,
    storage: Arc<InMemoryStorage>,
    gateway: Arc<RecordingGateway>,
    feed: Arc<ChangeFeed>,
}

fn harness() -> Harness {
    let storage = Arc::new(InMemoryStorage::new());
    let gateway = Arc::new(RecordingGateway::new());
    let feed = Arc::new(ChangeFeed::new(256));
    let minipad = Minipad::new(storage.clone(), feed.clone())
        .with_attestation(gateway.clone())
        .with_dispatch(AttestationDispatch::Inline);
    Harness {
        minipad,
        storage,
        gateway,
        feed,
    }
}

fn actor(name: &str) -> Actor {
    Actor::new(format!("0x{}", name))
}

#[tokio::test]
async fn board_lifecycle_from_submission_to_deletion() {
    let h = harness();
    let (a, b, c, d) = (actor("a"), actor("b"), actor("c"), actor("d"));

    let idea = h
        .minipad
        .submit_idea(&a, SubmitIdeaRequest::new("Tip jar", "Tips for casters"))
        .await
        .unwrap();
    assert_idea_status(&idea, IdeaStatus::Open);
    assert_eq!(idea.upvotes, 0);
    let id = idea.idea_id;

    let first = h.minipad.upvote(&b, id).await.unwrap();
    assert_eq!(first.upvotes, 1);
    let again = h.minipad.upvote(&b, id).await.unwrap();
    assert!(!again.changed);
    assert_eq!(again.upvotes, 1);
    assert_upvote_ledger_consistent(h.storage.as_ref(), id);

    let (claimed, _) = h
        .minipad
        .claim_idea(&c, id, ClaimIdeaRequest::default())
        .await
        .unwrap();
    assert_idea_status(&claimed, IdeaStatus::Claimed);
    assert_eq!(claimed.claimed_by.as_deref(), Some("0xc"));

    let rejected = h
        .minipad
        .claim_idea(&d, id, ClaimIdeaRequest::default())
        .await;
    assert_invalid_transition(&rejected, IdeaStatus::Claimed);
    assert_eq!(h.minipad.get_idea(id).unwrap(), Some(claimed.clone()));

    let released = h.minipad.unclaim_idea(&c, id).await.unwrap();
    assert_idea_status(&released.idea, IdeaStatus::Open);

    h.minipad
        .claim_idea(&c, id, ClaimIdeaRequest::default())
        .await
        .unwrap();
    let (completed, claim) = h
        .minipad
        .complete_idea(&c, id, CompleteIdeaRequest::new("https://x"))
        .await
        .unwrap();
    assert_idea_status(&completed, IdeaStatus::Completed);
    assert_eq!(completed.deployment_url.as_deref(), Some("https://x"));
    assert!(claim.is_some());

    let removed = h.minipad.delete_idea(&a, id).await.unwrap();
    assert_eq!(removed.upvotes_removed, 1);
    assert_eq!(removed.claims_removed, 1);
    assert_eq!(h.minipad.get_idea(id).unwrap(), None);
    assert_no_orphans(h.storage.as_ref(), id);
}

#[tokio::test]
async fn completed_idea_rejects_every_transition() {
    let h = harness();
    let (a, c) = (actor("a"), actor("c"));
    let idea = h
        .minipad
        .submit_idea(&a, SubmitIdeaRequest::new("Poll frame", "Polls"))
        .await
        .unwrap();
    h.minipad
        .claim_idea(&c, idea.idea_id, ClaimIdeaRequest::default())
        .await
        .unwrap();
    h.minipad
        .complete_idea(&c, idea.idea_id, CompleteIdeaRequest::new("https://poll.example"))
        .await
        .unwrap();

    assert_invalid_transition(
        &h.minipad
            .claim_idea(&actor("e"), idea.idea_id, ClaimIdeaRequest::default())
            .await,
        IdeaStatus::Completed,
    );
    assert_invalid_transition(
        &h.minipad.unclaim_idea(&c, idea.idea_id).await,
        IdeaStatus::Completed,
    );
    assert_invalid_transition(
        &h.minipad
            .complete_idea(&c, idea.idea_id, CompleteIdeaRequest::new("https://again.example"))
            .await,
        IdeaStatus::Completed,
    );
    let current = h.minipad.get_idea(idea.idea_id).unwrap().unwrap();
    assert_eq!(current.deployment_url.as_deref(), Some("https://poll.example"));
}

#[tokio::test]
async fn attestations_are_recorded_on_their_targets() {
    let h = harness();
    let (a, c) = (actor("a"), actor("c"));

    let idea = h
        .minipad
        .submit_idea(&a, SubmitIdeaRequest::new("Tip jar", "Tips"))
        .await
        .unwrap();
    let stored = h.minipad.get_idea(idea.idea_id).unwrap().unwrap();
    assert!(stored.attestation_uid.is_some());

    let (_, claim) = h
        .minipad
        .claim_idea(&c, idea.idea_id, ClaimIdeaRequest::default())
        .await
        .unwrap();
    let claim = h.storage.claim_get(claim.claim_id).unwrap().unwrap();
    assert!(claim.attestation_uid.is_some());

    h.minipad
        .complete_idea(&c, idea.idea_id, CompleteIdeaRequest::new("https://tips.example"))
        .await
        .unwrap();
    let stored = h.minipad.get_idea(idea.idea_id).unwrap().unwrap();
    assert!(stored.completion_attestation_uid.is_some());

    let remix = h
        .minipad
        .create_remix(&a, idea.idea_id, SubmitIdeaRequest::new("Tip jar v2", "More tips"))
        .await
        .unwrap();
    let stored_remix = h.minipad.get_idea(remix.idea_id).unwrap().unwrap();
    assert!(stored_remix.remix_attestation_uid.is_some());

    assert_eq!(
        h.gateway.attested_kinds(),
        vec![
            SchemaKind::Idea,
            SchemaKind::Claim,
            SchemaKind::Completion,
            SchemaKind::Remix
        ]
    );
}

#[tokio::test]
async fn client_supplied_attestation_skips_the_gateway() {
    let h = harness();
    let request = SubmitIdeaRequest {
        attestation_uid: Some("0xclient".to_string()),
        ..SubmitIdeaRequest::new("Tip jar", "Tips")
    };
    let idea = h.minipad.submit_idea(&actor("a"), request).await.unwrap();
    assert_eq!(idea.attestation_uid.as_deref(), Some("0xclient"));
    assert!(h.gateway.attested().is_empty());
}

#[tokio::test]
async fn unclaim_and_delete_revoke_attestations() {
    let h = harness();
    let (a, c) = (actor("a"), actor("c"));
    let idea = h
        .minipad
        .submit_idea(&a, SubmitIdeaRequest::new("Tip jar", "Tips"))
        .await
        .unwrap();
    h.minipad
        .claim_idea(&c, idea.idea_id, ClaimIdeaRequest::default())
        .await
        .unwrap();

    let outcome = h.minipad.unclaim_idea(&c, idea.idea_id).await.unwrap();
    let claim_uid = outcome.attestation_uid.unwrap();
    h.minipad.delete_idea(&a, idea.idea_id).await.unwrap();

    let revoked = h.gateway.revoked();
    assert_eq!(revoked.len(), 2);
    assert_eq!(revoked[0], (claim_uid, SchemaKind::Claim));
    assert_eq!(revoked[1].1, SchemaKind::Idea);
}

#[tokio::test]
async fn gateway_failure_never_rolls_back() {
    let storage = Arc::new(InMemoryStorage::new());
    let minipad = Minipad::new(storage.clone(), Arc::new(ChangeFeed::new(16)))
        .with_attestation(Arc::new(FailingGateway))
        .with_dispatch(AttestationDispatch::Inline);
    let (a, c) = (actor("a"), actor("c"));

    let idea = minipad
        .submit_idea(&a, SubmitIdeaRequest::new("Tip jar", "Tips"))
        .await
        .unwrap();
    assert!(idea.attestation_uid.is_none());

    let (claimed, _) = minipad
        .claim_idea(&c, idea.idea_id, ClaimIdeaRequest::default())
        .await
        .unwrap();
    assert_idea_status(&claimed, IdeaStatus::Claimed);

    minipad.delete_idea(&a, idea.idea_id).await.unwrap();
    assert_no_orphans(storage.as_ref(), idea.idea_id);
}

#[tokio::test]
async fn remix_of_missing_original_creates_nothing() {
    let h = harness();
    let missing = fixtures::open_idea().idea_id;
    let result = h
        .minipad
        .create_remix(&actor("a"), missing, SubmitIdeaRequest::new("Remix", "Of nothing"))
        .await;
    assert_not_found(&result, EntityType::Idea);
    assert_eq!(h.storage.idea_count().unwrap(), 0);
}

#[tokio::test]
async fn mutations_are_broadcast_in_commit_order() {
    let h = harness();
    let mut rx = h.feed.subscribe();
    let (a, b) = (actor("a"), actor("b"));

    let idea = h
        .minipad
        .submit_idea(&a, SubmitIdeaRequest::new("Tip jar", "Tips"))
        .await
        .unwrap();
    h.minipad.upvote(&b, idea.idea_id).await.unwrap();
    h.minipad.upvote(&b, idea.idea_id).await.unwrap();
    h.minipad.remove_upvote(&b, idea.idea_id).await.unwrap();

    let mut types = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => {
                assert!(event.concerns(idea.idea_id));
                types.push(event.event_type());
            }
            Err(TryRecvError::Empty) => break,
            Err(e) => panic!("unexpected receive error: {:?}", e),
        }
    }
    // The attestation patch is broadcast as an update right after submission.
    assert_eq!(
        types,
        vec!["IdeaSubmitted", "IdeaUpdated", "UpvoteAdded", "UpvoteRemoved"]
    );

    let event = MinipadEvent::IdeaDeleted {
        idea_id: idea.idea_id,
    };
    assert!(event.is_mutation());
}
