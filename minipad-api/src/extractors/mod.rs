//! Custom request extractors.

mod actor;
mod path_id;

pub use actor::{actor_from_headers, ActorExtractor};
pub use path_id::PathId;
