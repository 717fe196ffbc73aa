//! Lifecycle rules for ideas.
//!
//! Every function here is pure: it inspects the current record and the
//! requester and returns either the patch to apply or a typed error. Nothing
//! is written until the caller commits the returned plan.

use crate::{
    Actor, Claim, ClaimStatus, ClaimUpdate, Idea, IdeaAction, IdeaStatus, IdeaUpdate,
    LifecycleError, MinipadResult, Timestamp, ValidationError,
};

/// Completion data supplied by the claimer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDetails {
    pub deployment_url: String,
    pub github_url: Option<String>,
    pub completion_attestation_uid: Option<String>,
}

/// Writes required to move an open idea to claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPlan {
    pub claim: Claim,
    pub idea_update: IdeaUpdate,
}

/// Writes required to move a claimed idea to completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPlan {
    pub idea_update: IdeaUpdate,
    pub claim_update: ClaimUpdate,
}

fn invalid_transition(idea: &Idea, action: IdeaAction, reason: &str) -> LifecycleError {
    LifecycleError::InvalidTransition {
        idea_id: idea.idea_id,
        status: idea.status,
        action,
        reason: reason.to_string(),
    }
}

fn not_owner(idea: &Idea, action: IdeaAction, requester: &str, reason: &str) -> LifecycleError {
    LifecycleError::NotOwner {
        idea_id: idea.idea_id,
        action,
        requester: requester.to_string(),
        reason: reason.to_string(),
    }
}

/// `open -> claimed`.
pub fn plan_claim(
    idea: &Idea,
    claimer: &Actor,
    attestation_uid: Option<String>,
    now: Timestamp,
) -> Result<ClaimPlan, LifecycleError> {
    if idea.status != IdeaStatus::Open {
        return Err(invalid_transition(
            idea,
            IdeaAction::Claim,
            "Idea is not available for claiming",
        ));
    }

    let claim = Claim::new(idea.idea_id, claimer, attestation_uid, now);
    let idea_update = IdeaUpdate {
        status: Some(IdeaStatus::Claimed),
        claimed_by: Some(Some(claimer.address.clone())),
        claimed_at: Some(Some(now)),
        ..Default::default()
    };
    Ok(ClaimPlan { claim, idea_update })
}

/// `claimed -> open`. Ownership is checked before status.
pub fn plan_unclaim(idea: &Idea, requester: &str) -> Result<IdeaUpdate, LifecycleError> {
    if !idea.is_claimed_by(requester) {
        return Err(not_owner(
            idea,
            IdeaAction::Unclaim,
            requester,
            "Idea is not claimed by this user",
        ));
    }
    if idea.status != IdeaStatus::Claimed {
        return Err(invalid_transition(
            idea,
            IdeaAction::Unclaim,
            "Idea is not in claimed status",
        ));
    }

    Ok(IdeaUpdate {
        status: Some(IdeaStatus::Open),
        claimed_by: Some(None),
        claimed_at: Some(None),
        ..Default::default()
    })
}

/// `claimed -> completed`. Ownership is checked before status.
pub fn plan_complete(
    idea: &Idea,
    requester: &str,
    completion: &CompletionDetails,
    now: Timestamp,
) -> Result<CompletionPlan, LifecycleError> {
    if !idea.is_claimed_by(requester) {
        return Err(not_owner(
            idea,
            IdeaAction::Complete,
            requester,
            "Only the claimer can complete this idea",
        ));
    }
    if idea.status != IdeaStatus::Claimed {
        return Err(invalid_transition(
            idea,
            IdeaAction::Complete,
            "Idea is not in claimed status",
        ));
    }

    let idea_update = IdeaUpdate {
        status: Some(IdeaStatus::Completed),
        completed_at: Some(now),
        github_url: completion.github_url.clone(),
        deployment_url: Some(completion.deployment_url.clone()),
        completion_attestation_uid: completion.completion_attestation_uid.clone(),
        ..Default::default()
    };
    let claim_update = ClaimUpdate {
        status: Some(ClaimStatus::Completed),
        completed_at: Some(now),
        miniapp_url: Some(completion.deployment_url.clone()),
        completion_attestation_uid: completion.completion_attestation_uid.clone(),
        ..Default::default()
    };
    Ok(CompletionPlan {
        idea_update,
        claim_update,
    })
}

/// Deletion is allowed in any status, by the author only.
pub fn check_delete(idea: &Idea, requester: &str) -> Result<(), LifecycleError> {
    if idea.author != requester {
        return Err(not_owner(
            idea,
            IdeaAction::Delete,
            requester,
            "Only the author can delete their idea",
        ));
    }
    Ok(())
}

pub fn check_delete_remix(idea: &Idea, requester: &str) -> MinipadResult<()> {
    if idea.author != requester {
        return Err(not_owner(
            idea,
            IdeaAction::DeleteRemix,
            requester,
            "Only the author can delete their remix",
        )
        .into());
    }
    if !idea.is_remix {
        return Err(ValidationError::InvalidValue {
            field: "idea_id".to_string(),
            reason: "This is not a remix".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Remixes only go one level deep.
pub fn check_remix_target(original: &Idea) -> Result<(), ValidationError> {
    if original.is_remix {
        return Err(ValidationError::InvalidValue {
            field: "original_idea_id".to_string(),
            reason: "A remix cannot be remixed".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthorProfile, IdeaDraft};
    use chrono::Utc;
    use proptest::prelude::*;

    fn open_idea(author: &str) -> Idea {
        Idea::from_draft(
            IdeaDraft {
                title: "Split the bill".to_string(),
                description: "Group payments inside a cast".to_string(),
                author: author.to_string(),
                profile: AuthorProfile::default(),
                attestation_uid: None,
            },
            Utc::now(),
        )
    }

    fn shipped() -> CompletionDetails {
        CompletionDetails {
            deployment_url: "https://x".to_string(),
            github_url: None,
            completion_attestation_uid: None,
        }
    }

    #[test]
    fn test_claim_open_idea() {
        let idea = open_idea("0xa");
        let claimer = Actor::new("0xc").with_fid(42);
        let now = Utc::now();
        let plan = plan_claim(&idea, &claimer, Some("0xatt".to_string()), now).unwrap();

        assert_eq!(plan.claim.idea_id, idea.idea_id);
        assert_eq!(plan.claim.claimer, "0xc");
        assert_eq!(plan.claim.claimer_fid, Some(42));
        assert_eq!(plan.claim.status, ClaimStatus::Claimed);

        let mut updated = idea.clone();
        plan.idea_update.apply_to(&mut updated);
        assert_eq!(updated.status, IdeaStatus::Claimed);
        assert_eq!(updated.claimed_by.as_deref(), Some("0xc"));
        assert_eq!(updated.claimed_at, Some(now));
    }

    #[test]
    fn test_claim_rejected_unless_open() {
        let mut idea = open_idea("0xa");
        idea.status = IdeaStatus::Claimed;
        idea.claimed_by = Some("0xc".to_string());

        let err = plan_claim(&idea, &Actor::new("0xd"), None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                action: IdeaAction::Claim,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Idea is not available for claiming");
    }

    #[test]
    fn test_unclaim_by_non_claimer_is_not_owner() {
        let mut idea = open_idea("0xa");
        idea.status = IdeaStatus::Claimed;
        idea.claimed_by = Some("0xc".to_string());

        let err = plan_unclaim(&idea, "0xd").unwrap_err();
        assert!(matches!(err, LifecycleError::NotOwner { .. }));
    }

    #[test]
    fn test_unclaim_clears_claim_fields() {
        let mut idea = open_idea("0xa");
        let plan = plan_claim(&idea, &Actor::new("0xc"), None, Utc::now()).unwrap();
        plan.idea_update.apply_to(&mut idea);

        plan_unclaim(&idea, "0xc").unwrap().apply_to(&mut idea);
        assert_eq!(idea.status, IdeaStatus::Open);
        assert!(idea.claimed_by.is_none());
        assert!(idea.claimed_at.is_none());
    }

    #[test]
    fn test_complete_checks_owner_before_status() {
        let idea = open_idea("0xa");
        // Unclaimed: nobody owns it, so ownership fails first.
        let err = plan_complete(&idea, "0xc", &shipped(), Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Only the claimer can complete this idea");
    }

    #[test]
    fn test_complete_sets_completion_fields_on_idea_and_claim() {
        let mut idea = open_idea("0xa");
        plan_claim(&idea, &Actor::new("0xc"), None, Utc::now())
            .unwrap()
            .idea_update
            .apply_to(&mut idea);

        let now = Utc::now();
        let details = CompletionDetails {
            deployment_url: "https://x".to_string(),
            github_url: Some("https://github.com/c/x".to_string()),
            completion_attestation_uid: Some("0xdone".to_string()),
        };
        let plan = plan_complete(&idea, "0xc", &details, now).unwrap();
        plan.idea_update.apply_to(&mut idea);

        assert_eq!(idea.status, IdeaStatus::Completed);
        assert_eq!(idea.completed_at, Some(now));
        assert_eq!(idea.deployment_url.as_deref(), Some("https://x"));
        assert_eq!(idea.completion_attestation_uid.as_deref(), Some("0xdone"));
        assert_eq!(plan.claim_update.status, Some(ClaimStatus::Completed));
        assert_eq!(plan.claim_update.miniapp_url.as_deref(), Some("https://x"));
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut idea = open_idea("0xa");
        idea.status = IdeaStatus::Completed;
        idea.claimed_by = Some("0xc".to_string());

        assert!(plan_claim(&idea, &Actor::new("0xd"), None, Utc::now()).is_err());
        assert!(plan_unclaim(&idea, "0xc").is_err());
        assert!(plan_complete(&idea, "0xc", &shipped(), Utc::now()).is_err());
    }

    #[test]
    fn test_delete_requires_author() {
        let idea = open_idea("0xa");
        assert!(check_delete(&idea, "0xa").is_ok());
        let err = check_delete(&idea, "0xb").unwrap_err();
        assert_eq!(err.to_string(), "Only the author can delete their idea");
    }

    #[test]
    fn test_delete_remix_rejects_plain_idea() {
        let idea = open_idea("0xa");
        let err = check_delete_remix(&idea, "0xa").unwrap_err();
        assert!(err.to_string().contains("This is not a remix"));

        let remix = Idea::remix_of(
            idea.idea_id,
            IdeaDraft {
                title: "Split the bill, in USDC".to_string(),
                description: "Same, stablecoins only".to_string(),
                author: "0xb".to_string(),
                profile: AuthorProfile::default(),
                attestation_uid: None,
            },
            Utc::now(),
        );
        assert!(check_delete_remix(&remix, "0xb").is_ok());
        assert!(check_delete_remix(&remix, "0xa").is_err());
        assert!(check_remix_target(&remix).is_err());
        assert!(check_remix_target(&idea).is_ok());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Claim(usize),
        Unclaim(usize),
        Complete(usize),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..3).prop_map(Step::Claim),
            (0usize..3).prop_map(Step::Unclaim),
            (0usize..3).prop_map(Step::Complete),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any sequence of lifecycle attempts only follows edges of the status
        /// graph, keeps claim fields consistent with status, and never leaves
        /// `completed`.
        #[test]
        fn prop_status_follows_graph(steps in prop::collection::vec(step_strategy(), 0..40)) {
            let users = ["0xc", "0xd", "0xe"];
            let mut idea = open_idea("0xa");

            for step in steps {
                let before = idea.clone();
                let result = match step {
                    Step::Claim(u) => plan_claim(&idea, &Actor::new(users[u]), None, Utc::now())
                        .map(|plan| plan.idea_update),
                    Step::Unclaim(u) => plan_unclaim(&idea, users[u]),
                    Step::Complete(u) => plan_complete(&idea, users[u], &shipped(), Utc::now())
                        .map(|plan| plan.idea_update),
                };

                match result {
                    Ok(update) => {
                        update.apply_to(&mut idea);
                        prop_assert!(before.status.can_transition_to(idea.status));
                    }
                    Err(_) => prop_assert_eq!(&idea, &before),
                }

                prop_assert_eq!(idea.claimed_by.is_some(), idea.status != IdeaStatus::Open);
                if before.status == IdeaStatus::Completed {
                    prop_assert_eq!(idea.status, IdeaStatus::Completed);
                }
            }
        }
    }
}
