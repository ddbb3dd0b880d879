use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::Translator;

pub struct GoogleTranslator {
    api_key: String,
    client: reqwest::Client,
}

impl GoogleTranslator {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String> {
        let url = format!(
            "https://translation.googleapis.com/language/translate/v2?key={}",
            self.api_key
        );

        let body = json!({
            "q": text,
            "target": target_lang,
            "format": "text",
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("failed to call Translate API")?
            .error_for_status()
            .context("Translate API returned error")?;

        let data: TranslateResponse = resp
            .json()
            .await
            .context("failed to parse Translate response")?;

        data.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| anyhow::anyhow!("missing translation in Translate response"))
    }
}
