pub mod analyzer;
pub mod conversation;
pub mod essentials;
pub mod extract;
pub mod text;

pub use analyzer::analyze;
pub use conversation::{Conversation, Message, Speaker};
pub use essentials::{FILLER_OPENERS, SessionEssentials, derive_essentials};
