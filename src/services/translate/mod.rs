pub mod google;

use async_trait::async_trait;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Whether the provider can be called at all. Unconfigured installs
    /// degrade to pass-through instead of failing requests.
    fn is_configured(&self) -> bool;

    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String>;
}
