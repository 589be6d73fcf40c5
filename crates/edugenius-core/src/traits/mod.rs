//! Trait seams between the question bank and its collaborators.

pub mod provider;
pub mod tool;

pub use provider::{ChatModel, Embedder};
pub use tool::Tool;
