//! Test-only utilities: temp worlds and synthetic foreign stores.

pub mod sources;
pub mod world;

pub use sources::{
    augment_exchange, claude_events, seed_augment_store, seed_claude_session, seed_warp_db,
};
pub use world::TestWorld;
