//! Core engine: plan acquisition and validation, the phased execution state
//! machine, narration policy, debate summarization, and city analytics.
//!
//! Persistence ([`cityforge_db::store::ProjectStore`]) and the generative
//! backend ([`llm::CompletionClient`]) are consumed through traits; nothing
//! here owns a connection or an HTTP client beyond the provided
//! implementations.

pub mod access;
pub mod analytics;
pub mod llm;
pub mod orchestrator;
pub mod plan;
pub mod roles;
pub mod state;
pub mod summary;
