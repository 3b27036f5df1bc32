//! The recommendation boundary around the upstream completion provider.
//!
//! One operation: turn a user's symptom description into a reply text,
//! collapsing every provider-side failure into a single fallback outcome.

mod client;
pub mod types;

pub use client::{ProviderError, Recommendation, RecommenderClient, FALLBACK_TEXT};
