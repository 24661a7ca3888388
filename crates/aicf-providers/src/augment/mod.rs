mod reader;
mod schema;

pub use reader::AugmentReader;
pub(crate) use schema::{ExchangeValue, WorkspaceJson};
