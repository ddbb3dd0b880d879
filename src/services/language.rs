use whatlang::Lang;

use crate::services::translate::Translator;

/// Language used when detection fails and the one replies are authored in.
pub const DEFAULT_LANG: &str = "en";

/// Detects the ISO 639-1 language code of a message. Never fails: an
/// undetectable or unmapped language falls back to the default.
pub fn detect_language(text: &str) -> String {
    match whatlang::detect(text) {
        Some(info) => iso639_1(info.lang()).to_string(),
        None => {
            tracing::warn!("language detection failed, defaulting to {DEFAULT_LANG}");
            DEFAULT_LANG.to_string()
        }
    }
}

/// Translates user-facing text into the detected language, fail-open: the
/// default language, an unconfigured provider, and provider errors all
/// yield the original text.
pub async fn localize(translator: &dyn Translator, text: &str, lang: &str) -> String {
    if lang == DEFAULT_LANG || !translator.is_configured() {
        return text.to_string();
    }

    match translator.translate(text, lang).await {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!(error = %e, lang = %lang, "translation failed, returning original text");
            text.to_string()
        }
    }
}

// whatlang reports ISO 639-3; the translator and phrase tables speak 639-1.
fn iso639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Tur => "tr",
        Lang::Ell => "el",
        Lang::Bul => "bg",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Pes => "fa",
        Lang::Urd => "ur",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Nep => "ne",
        Lang::Tam => "ta",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        _ => DEFAULT_LANG,
    }
}
