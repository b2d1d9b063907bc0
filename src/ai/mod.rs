pub mod gemini;

pub use gemini::GeminiClient;

use anyhow::Result;
use async_trait::async_trait;

/// Opaque text-in/text-out generative service.
///
/// Implementations make no promises about the shape or validity of the
/// returned text; callers own validation and recovery.
#[async_trait]
pub trait Generator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
