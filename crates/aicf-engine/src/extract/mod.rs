//! Rule-based extractors over a reconstructed conversation.
//!
//! No machine learning anywhere: each extractor is a fixed rule set over
//! keywords and patterns, so the same conversation always yields the same
//! analysis. Each module owns its keyword tables.

pub mod action;
pub mod decision;
pub mod flow;
pub mod intent;
pub mod state;
pub mod technical;
