//! Query gateway seam.
//!
//! The concrete Gemini client lives in `agroclimate-interaction`; the
//! controller only depends on this trait, so tests can substitute a fake.

use async_trait::async_trait;

use crate::error::Result;
use crate::source::Source;

/// A grounded answer returned by the external service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReply {
    /// Synthesized answer text (markdown).
    pub text: String,
    /// Cited sources, filtered of empty locators and deduplicated.
    pub sources: Vec<Source>,
}

/// Sends one user prompt to the external generative service and reshapes
/// the response. Failure is an expected, first-class outcome carried in the
/// `Result`; implementations never retry and never return partial results.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    async fn run_query(&self, prompt: &str) -> Result<QueryReply>;
}
