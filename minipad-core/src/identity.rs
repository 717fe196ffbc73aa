//! Identity types for Minipad entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Wallet address of a user (author, claimer, voter).
///
/// Compared verbatim; the wallet connector is responsible for producing a
/// stable representation.
pub type WalletAddress = String;

/// Farcaster user id.
pub type Fid = u64;

/// Common behavior of the strongly-typed entity identifiers.
///
/// Identifiers are UUIDv7 so they sort by creation time.
pub trait EntityIdType:
    Copy + Eq + std::hash::Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Human-readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    /// Wrap a raw UUID.
    fn new(uuid: Uuid) -> Self;

    /// Borrow the raw UUID.
    fn as_uuid(&self) -> Uuid;

    /// Generate a fresh timestamp-sortable identifier.
    fn now_v7() -> Self {
        Self::new(Uuid::now_v7())
    }

    /// The nil identifier, useful for tests and placeholders.
    fn nil() -> Self {
        Self::new(Uuid::nil())
    }
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity;

            fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_entity_id!(
    /// Identifier of an idea (remixes share the idea id space).
    IdeaId,
    "Idea"
);

define_entity_id!(
    /// Identifier of a claim record.
    ClaimId,
    "Claim"
);

define_entity_id!(
    /// Identifier of an upvote record.
    UpvoteId,
    "Upvote"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_time_sortable() {
        let first = IdeaId::now_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = IdeaId::now_v7();
        assert!(first < second);
    }

    #[test]
    fn test_id_parse_display_roundtrip() {
        let id = ClaimId::now_v7();
        let parsed: ClaimId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ClaimId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_plain_uuid() {
        let id = UpvoteId::nil();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
