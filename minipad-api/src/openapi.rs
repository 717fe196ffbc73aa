//! OpenAPI Specification for the Minipad API
//!
//! Generated from the route annotations and the request/response types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{claim, health, idea, profile, remix, upvote, user};
use crate::types::*;

use minipad_core::{
    AuthorProfile, Claim, ClaimId, ClaimStatus, Idea, IdeaId, IdeaStatus, Profile, Upvote,
};

/// OpenAPI document for the Minipad API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Minipad API",
        version = "0.1.0",
        description = "Idea board for Farcaster mini apps: submit ideas, upvote them, claim one to build, ship it, or remix it",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Ideas", description = "Submitting, listing and deleting ideas"),
        (name = "Upvotes", description = "One upvote per wallet per idea"),
        (name = "Claims", description = "Claim, release and complete lifecycle"),
        (name = "Remixes", description = "Derived ideas linked to an original"),
        (name = "Users", description = "Per-wallet views of the board"),
        (name = "Profiles", description = "Farcaster profile lookup"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        // === Idea Routes ===
        idea::list_ideas,
        idea::submit_idea,
        idea::get_idea,
        idea::delete_idea,
        idea::update_attestation,

        // === Upvote Routes ===
        upvote::upvote,
        upvote::remove_upvote,
        upvote::upvote_status,

        // === Claim Routes ===
        claim::claim_idea,
        claim::unclaim_idea,
        claim::complete_idea,
        claim::list_claims,

        // === Remix Routes ===
        remix::create_remix,
        remix::list_remixes,
        remix::delete_remix,

        // === User Routes ===
        user::submitted_ideas,
        user::claimed_ideas,
        user::completed_ideas,
        user::user_claims,

        // === Profile Routes ===
        profile::get_profile,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Domain Types ===
            Idea, IdeaId, IdeaStatus, AuthorProfile, Claim, ClaimId, ClaimStatus, Upvote, Profile,

            // === Idea Types ===
            SubmitIdeaRequest, UpdateAttestationRequest, IdeaSort, IdeaResponse,
            ListIdeasResponse, DeleteIdeaResponse,

            // === Claim Types ===
            ClaimIdeaRequest, CompleteIdeaRequest, ClaimResponse, UnclaimResponse,
            CompleteResponse, ListClaimsResponse,

            // === Upvote Types ===
            UpvoteResponse, UpvoteStatusResponse,

            // === Health Types ===
            HealthResponse, HealthStatus, HealthDetails, ComponentHealth,
        )
    )
)]
pub struct ApiDoc;
