//! Property-based tests for the idea lifecycle
//!
//! Random action sequences from a small wallet pool are replayed against one
//! idea. After every step the lifecycle and the upvote ledger must still be
//! consistent, and a rejected action must leave the idea untouched.

use std::sync::Arc;

use minipad_api::{ChangeFeed, ClaimIdeaRequest, CompleteIdeaRequest, Minipad, SubmitIdeaRequest};
use minipad_core::{Actor, ClaimStatus, EntityType, IdeaStatus, MinipadResult};
use minipad_storage::{InMemoryStorage, StorageTrait};
use minipad_test_utils::assertions::{
    assert_no_orphans, assert_not_found, assert_not_owner, assert_ok, assert_upvote_ledger_consistent,
    assert_validation_error,
};
use minipad_test_utils::generators::{
    arb_blank, arb_description, arb_idea_id, arb_idea_in_status, arb_wallet_from_pool,
};
use proptest::prelude::*;

const POOL: usize = 4;

#[derive(Debug, Clone)]
enum Action {
    Upvote(String),
    RemoveUpvote(String),
    Claim(String),
    Unclaim(String),
    Complete(String),
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        arb_wallet_from_pool(POOL).prop_map(Action::Upvote),
        arb_wallet_from_pool(POOL).prop_map(Action::RemoveUpvote),
        arb_wallet_from_pool(POOL).prop_map(Action::Claim),
        arb_wallet_from_pool(POOL).prop_map(Action::Unclaim),
        arb_wallet_from_pool(POOL).prop_map(Action::Complete),
    ]
}

fn allowed(from: IdeaStatus, to: IdeaStatus) -> bool {
    matches!(
        (from, to),
        (IdeaStatus::Open, IdeaStatus::Open)
            | (IdeaStatus::Open, IdeaStatus::Claimed)
            | (IdeaStatus::Claimed, IdeaStatus::Claimed)
            | (IdeaStatus::Claimed, IdeaStatus::Open)
            | (IdeaStatus::Claimed, IdeaStatus::Completed)
            | (IdeaStatus::Completed, IdeaStatus::Completed)
    )
}

async fn replay(actions: Vec<Action>) {
    let storage = Arc::new(InMemoryStorage::new());
    let minipad = Minipad::new(storage.clone(), Arc::new(ChangeFeed::new(16)));
    let idea = minipad
        .submit_idea(&Actor::new("0xauthor"), SubmitIdeaRequest::new("Tip jar", "Tips"))
        .await
        .unwrap();
    let idea_id = idea.idea_id;

    for action in actions {
        let before = storage.idea_get(idea_id).unwrap().unwrap();

        let result: MinipadResult<()> = match &action {
            Action::Upvote(wallet) => minipad.upvote(&Actor::new(wallet), idea_id).await.map(drop),
            Action::RemoveUpvote(wallet) => minipad
                .remove_upvote(&Actor::new(wallet), idea_id)
                .await
                .map(drop),
            Action::Claim(wallet) => minipad
                .claim_idea(&Actor::new(wallet), idea_id, ClaimIdeaRequest::default())
                .await
                .map(drop),
            Action::Unclaim(wallet) => minipad
                .unclaim_idea(&Actor::new(wallet), idea_id)
                .await
                .map(drop),
            Action::Complete(wallet) => minipad
                .complete_idea(
                    &Actor::new(wallet),
                    idea_id,
                    CompleteIdeaRequest::new("https://app.example"),
                )
                .await
                .map(drop),
        };

        match &action {
            Action::Upvote(_) | Action::RemoveUpvote(_) => assert_ok(&result),
            Action::Unclaim(wallet) | Action::Complete(wallet)
                if before.claimed_by.as_deref() != Some(wallet.as_str()) =>
            {
                assert_not_owner(&result)
            }
            _ => {}
        }
        let rejected = result.is_err();

        let after = storage.idea_get(idea_id).unwrap().unwrap();
        if rejected {
            assert_eq!(after, before, "rejected {:?} changed the idea", action);
        }
        assert!(
            allowed(before.status, after.status),
            "{:?} moved {:?} -> {:?}",
            action,
            before.status,
            after.status
        );
        match after.status {
            IdeaStatus::Open => assert!(after.claimed_by.is_none()),
            IdeaStatus::Claimed => assert!(after.claimed_by.is_some()),
            IdeaStatus::Completed => assert!(after.completed_at.is_some()),
        }

        assert_upvote_ledger_consistent(storage.as_ref(), idea_id);

        let active = storage
            .claim_list_by_idea(idea_id)
            .unwrap()
            .into_iter()
            .filter(|c| c.status == ClaimStatus::Claimed)
            .count();
        assert!(active <= 1, "{} active claims", active);
        if after.status == IdeaStatus::Claimed {
            assert_eq!(active, 1);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_lifecycle_stays_consistent(actions in prop::collection::vec(arb_action(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(replay(actions));
    }

    /// Every mutation on an unknown idea is NotFound and writes nothing.
    #[test]
    fn prop_unknown_idea_is_not_found(
        idea_id in arb_idea_id(),
        wallet in arb_wallet_from_pool(POOL),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let storage = Arc::new(InMemoryStorage::new());
            let minipad = Minipad::new(storage.clone(), Arc::new(ChangeFeed::new(16)));
            let actor = Actor::new(&wallet);

            assert_not_found(&minipad.upvote(&actor, idea_id).await, EntityType::Idea);
            assert_not_found(&minipad.remove_upvote(&actor, idea_id).await, EntityType::Idea);
            assert_not_found(
                &minipad.claim_idea(&actor, idea_id, ClaimIdeaRequest::default()).await,
                EntityType::Idea,
            );
            assert_not_found(&minipad.unclaim_idea(&actor, idea_id).await, EntityType::Idea);
            assert_not_found(
                &minipad
                    .complete_idea(&actor, idea_id, CompleteIdeaRequest::new("https://app.example"))
                    .await,
                EntityType::Idea,
            );

            assert_eq!(minipad.upvote_count(idea_id).unwrap(), 0);
            assert!(storage.idea_list(10).unwrap().is_empty());
            assert!(storage.upvote_list_by_voter(&wallet).unwrap().is_empty());
            assert!(storage.claim_list_by_claimer(&wallet).unwrap().is_empty());
        });
    }

    /// Only the author may delete, whatever the status, and deletion leaves
    /// no upvotes or claims behind.
    #[test]
    fn prop_delete_in_any_status_leaves_no_orphans(
        idea in arb_idea_in_status(),
        voters in prop::collection::vec(arb_wallet_from_pool(POOL), 0..6),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let storage = Arc::new(InMemoryStorage::new());
            storage.idea_insert(&idea).unwrap();
            let minipad = Minipad::new(storage.clone(), Arc::new(ChangeFeed::new(16)));
            for voter in &voters {
                assert_ok(&minipad.upvote(&Actor::new(voter), idea.idea_id).await);
            }

            assert_not_owner(&minipad.delete_idea(&Actor::new("0xstranger"), idea.idea_id).await);
            let mut distinct = voters.clone();
            distinct.sort();
            distinct.dedup();
            let kept = storage.idea_get(idea.idea_id).unwrap().unwrap();
            assert_eq!(kept.status, idea.status);
            assert_eq!(kept.upvotes, distinct.len() as u64);

            let deleted = minipad
                .delete_idea(&Actor::new(&idea.author), idea.idea_id)
                .await
                .unwrap();
            assert_eq!(deleted.upvotes_removed, distinct.len());
            assert_no_orphans(storage.as_ref(), idea.idea_id);
        });
    }

    /// Blank titles never reach the store.
    #[test]
    fn prop_blank_title_rejected(title in arb_blank(), description in arb_description()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let storage = Arc::new(InMemoryStorage::new());
            let minipad = Minipad::new(storage.clone(), Arc::new(ChangeFeed::new(16)));

            let result = minipad
                .submit_idea(&Actor::new("0xauthor"), SubmitIdeaRequest::new(title, description))
                .await;
            assert_validation_error(&result);
            assert!(storage.idea_list(10).unwrap().is_empty());
        });
    }

    /// Once completed, no action moves the idea again.
    #[test]
    fn prop_completed_is_terminal(
        claimer in arb_wallet_from_pool(POOL),
        actions in prop::collection::vec(arb_action(), 1..20),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let storage = Arc::new(InMemoryStorage::new());
            let minipad = Minipad::new(storage.clone(), Arc::new(ChangeFeed::new(16)));
            let actor = Actor::new(&claimer);
            let idea = minipad
                .submit_idea(&Actor::new("0xauthor"), SubmitIdeaRequest::new("Tip jar", "Tips"))
                .await
                .unwrap();
            minipad
                .claim_idea(&actor, idea.idea_id, ClaimIdeaRequest::default())
                .await
                .unwrap();
            minipad
                .complete_idea(&actor, idea.idea_id, CompleteIdeaRequest::new("https://app.example"))
                .await
                .unwrap();

            for action in actions {
                match action {
                    Action::Claim(wallet) => {
                        let result = minipad
                            .claim_idea(&Actor::new(&wallet), idea.idea_id, ClaimIdeaRequest::default())
                            .await;
                        assert!(result.is_err());
                    }
                    Action::Unclaim(wallet) => {
                        assert!(minipad.unclaim_idea(&Actor::new(&wallet), idea.idea_id).await.is_err());
                    }
                    Action::Complete(wallet) => {
                        let result = minipad
                            .complete_idea(
                                &Actor::new(&wallet),
                                idea.idea_id,
                                CompleteIdeaRequest::new("https://other.example"),
                            )
                            .await;
                        assert!(result.is_err());
                    }
                    Action::Upvote(wallet) => {
                        minipad.upvote(&Actor::new(&wallet), idea.idea_id).await.unwrap();
                    }
                    Action::RemoveUpvote(wallet) => {
                        minipad.remove_upvote(&Actor::new(&wallet), idea.idea_id).await.unwrap();
                    }
                }
                let current = storage.idea_get(idea.idea_id).unwrap().unwrap();
                assert_eq!(current.status, IdeaStatus::Completed);
                assert_eq!(current.deployment_url.as_deref(), Some("https://app.example"));
            }
        });
    }
}
