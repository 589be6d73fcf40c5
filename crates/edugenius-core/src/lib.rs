//! # EduGenius Core
//!
//! Shared kernel for the EduGenius question bank: configuration, the
//! unified error type, domain types, and the traits connecting the bank
//! to its collaborators (embedding provider, chat model, agent tools).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
