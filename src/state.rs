use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::calendar::CalendarProvider;
use crate::services::timeparse::TimeExtractor;
use crate::services::translate::Translator;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub translator: Box<dyn Translator>,
    pub calendar: Box<dyn CalendarProvider>,
    pub time_extractor: TimeExtractor,
}
