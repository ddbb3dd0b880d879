use std::sync::Arc;

use chrono::Utc;

use crate::db::queries;
use crate::models::Caller;
use crate::services::booking;
use crate::services::language::{detect_language, localize};
use crate::state::AppState;

const TIME_FALLBACK: &str = "Sorry, I couldn't understand the time for your appointment. Please specify the time clearly, e.g., '3 PM' or '15:00'.";

/// Top-level entry point: routes a message either to the booking flow or to
/// the answer generator. Every branch returns exactly one localized string;
/// no fault escapes to the caller.
pub async fn respond(state: &Arc<AppState>, text: &str, caller: &Caller) -> String {
    let lang = detect_language(text);
    tracing::info!(
        lang = %lang,
        authenticated = caller.is_authenticated(),
        "processing message"
    );

    let system_prompt = build_system_prompt(state, &lang).await;

    let now = Utc::now().naive_utc();
    if let Some(start) = state.time_extractor.extract(text, &lang, now) {
        let summary = format!("{} appointment", state.config.business_name);
        return booking::book(state, &summary, start, caller, &lang).await;
    }

    match state.llm.complete(&system_prompt, text).await {
        Ok(answer) => localize(state.translator.as_ref(), &answer, &lang).await,
        Err(e) => {
            tracing::error!(error = %e, "answer generation failed");
            localize(state.translator.as_ref(), TIME_FALLBACK, &lang).await
        }
    }
}

/// Renders the system instruction from the live catalog and FAQ set. A
/// failed catalog read degrades to an empty section rather than failing the
/// request.
async fn build_system_prompt(state: &Arc<AppState>, lang: &str) -> String {
    let (services, faqs) = {
        let db = state.db.lock().unwrap();
        let services = queries::list_services(&db).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load service catalog");
            vec![]
        });
        let faqs = queries::list_faqs(&db).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load FAQs");
            vec![]
        });
        (services, faqs)
    };

    let services_text = services
        .iter()
        .map(|s| format!("{}: ${:.2}", s.name, s.price))
        .collect::<Vec<_>>()
        .join("\n");
    let faqs_text = faqs
        .iter()
        .map(|f| format!("Q: {}\nA: {}", f.question, f.answer))
        .collect::<Vec<_>>()
        .join("\n");

    let business = &state.config.business_name;
    let prompt = format!(
        "You are a helpful assistant for {business}. Respond in the user's language and only \
         answer questions about our services, prices, appointments and opening hours.\n\n\
         Here are the current services and prices:\n{services_text}\n\n\
         Here are the FAQs to assist with common questions:\n{faqs_text}\n\n\
         If asked anything unrelated, reply with:\n\
         \"I'm here to assist with questions about {business} only. How can I help?\""
    );

    localize(state.translator.as_ref(), &prompt, lang).await
}
