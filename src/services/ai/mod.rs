pub mod gemini;
pub mod ollama;

use async_trait::async_trait;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// One-shot completion: system instruction plus the user's message.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String>;
}
