use std::collections::HashMap;

use chrono::NaiveDateTime;
use regex::Regex;

struct PhraseRule {
    pattern: Regex,
    hour: u32,
    minute: u32,
}

/// Pulls a concrete appointment time out of free text.
///
/// Matching is tried in priority order: 12-hour clock with am/pm marker,
/// then 24-hour clock, then a per-language table of idiomatic phrases.
/// The 24-hour pattern is deliberately permissive: any bare number in the
/// message is treated as an hour candidate and only rejected when out of
/// range, so "room 42" fails extraction while "meet at 9" parses as 9:00.
pub struct TimeExtractor {
    meridiem: Regex,
    clock24: Regex,
    phrases: HashMap<String, Vec<PhraseRule>>,
    tomorrow_keywords: HashMap<String, Vec<String>>,
}

impl TimeExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let mut extractor = Self {
            meridiem: Regex::new(r"(\d{1,2})(?::(\d{2}))?\s*(am|pm)")?,
            clock24: Regex::new(r"(\d{1,2})(?::|h)?(\d{2})?")?,
            phrases: HashMap::new(),
            tomorrow_keywords: HashMap::new(),
        };

        extractor.add_phrase("es", r"tres\s*de\s*la\s*tarde", 15, 0)?;
        extractor.add_phrase("es", r"cuatro\s*de\s*la\s*mañana", 4, 0)?;
        extractor.add_phrase("fr", r"quinze\s*heures", 15, 0)?;
        extractor.add_phrase("fr", r"dix\s*heures", 10, 0)?;

        extractor.add_tomorrow_keyword("en", "tomorrow");
        extractor.add_tomorrow_keyword("es", "mañana");
        extractor.add_tomorrow_keyword("fr", "demain");

        Ok(extractor)
    }

    /// Registers an idiomatic time phrase for a language. Rules are tried in
    /// registration order, first match wins.
    pub fn add_phrase(
        &mut self,
        lang: &str,
        pattern: &str,
        hour: u32,
        minute: u32,
    ) -> anyhow::Result<()> {
        let rule = PhraseRule {
            pattern: Regex::new(pattern)?,
            hour,
            minute,
        };
        self.phrases.entry(lang.to_string()).or_default().push(rule);
        Ok(())
    }

    pub fn add_tomorrow_keyword(&mut self, lang: &str, keyword: &str) {
        self.tomorrow_keywords
            .entry(lang.to_string())
            .or_default()
            .push(keyword.to_string());
    }

    /// Extracts an appointment time from `text`, resolving the date against
    /// `now`. Pure function of (text, lang, now); returns None when the
    /// message carries no parseable time.
    pub fn extract(&self, text: &str, lang: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let input = text.to_lowercase();
        let (hour, minute) = self.extract_hour_minute(&input, lang)?;

        let mut date = now.date();
        if self.mentions_tomorrow(&input, lang) {
            date = date.succ_opt()?;
        }

        // An out-of-range hour (e.g. "15 pm" -> 27) fails here, which is
        // reported as extraction failure rather than an error.
        date.and_hms_opt(hour, minute, 0)
    }

    fn extract_hour_minute(&self, input: &str, lang: &str) -> Option<(u32, u32)> {
        if let Some(caps) = self.meridiem.captures(input) {
            let mut hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            match &caps[3] {
                "pm" if hour != 12 => hour += 12,
                "am" if hour == 12 => hour = 0,
                _ => {}
            }
            return Some((hour, minute));
        }

        if let Some(caps) = self.clock24.captures(input) {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            // Hard stop on malformed numeric input: "24:00" is rejected, not
            // reinterpreted as a phrase.
            if hour > 23 || minute > 59 {
                return None;
            }
            return Some((hour, minute));
        }

        let rules = self.phrases.get(lang)?;
        rules
            .iter()
            .find(|rule| rule.pattern.is_match(input))
            .map(|rule| (rule.hour, rule.minute))
    }

    fn mentions_tomorrow(&self, input: &str, lang: &str) -> bool {
        self.tomorrow_keywords
            .get(lang)
            .map(|keywords| keywords.iter().any(|k| input.contains(k.as_str())))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TimeExtractor {
        TimeExtractor::new().unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-06-16 08:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_meridiem_basic() {
        let ex = extractor();
        assert_eq!(ex.extract("see you at 3 PM", "en", now()), Some(dt("2025-06-16 15:00")));
        assert_eq!(ex.extract("3:30 pm works", "en", now()), Some(dt("2025-06-16 15:30")));
        assert_eq!(ex.extract("11:45 AM", "en", now()), Some(dt("2025-06-16 11:45")));
    }

    #[test]
    fn test_meridiem_noon_and_midnight() {
        let ex = extractor();
        assert_eq!(ex.extract("12 am", "en", now()), Some(dt("2025-06-16 00:00")));
        assert_eq!(ex.extract("12 pm", "en", now()), Some(dt("2025-06-16 12:00")));
    }

    #[test]
    fn test_meridiem_out_of_range_hour_fails() {
        // "15 pm" converts to hour 27, which cannot form a valid time.
        assert_eq!(extractor().extract("15 pm", "en", now()), None);
    }

    #[test]
    fn test_clock24_formats() {
        let ex = extractor();
        assert_eq!(ex.extract("come at 15:00", "en", now()), Some(dt("2025-06-16 15:00")));
        assert_eq!(ex.extract("15h30 then", "en", now()), Some(dt("2025-06-16 15:30")));
        assert_eq!(ex.extract("23:59", "en", now()), Some(dt("2025-06-16 23:59")));
    }

    #[test]
    fn test_clock24_out_of_range_is_hard_stop() {
        let ex = extractor();
        assert_eq!(ex.extract("24:00", "en", now()), None);
        assert_eq!(ex.extract("12:60", "en", now()), None);
        // Even with a valid phrase later in the message, a matched-but-invalid
        // numeric pattern ends extraction.
        assert_eq!(ex.extract("24:00 o tres de la tarde", "es", now()), None);
    }

    #[test]
    fn test_bare_numbers() {
        let ex = extractor();
        // Known ambiguity: a lone small number parses as an hour.
        assert_eq!(ex.extract("meet at 9", "en", now()), Some(dt("2025-06-16 09:00")));
        // Out-of-range bare numbers fail.
        assert_eq!(ex.extract("it costs 42 dollars", "en", now()), None);
    }

    #[test]
    fn test_language_phrases() {
        let ex = extractor();
        assert_eq!(
            ex.extract("a las tres de la tarde", "es", now()),
            Some(dt("2025-06-16 15:00"))
        );
        assert_eq!(
            ex.extract("cuatro de la mañana", "es", now()),
            // "mañana" is also the tomorrow keyword, so the date advances.
            Some(dt("2025-06-17 04:00"))
        );
        assert_eq!(ex.extract("quinze heures", "fr", now()), Some(dt("2025-06-16 15:00")));
        // A phrase from another language's table does not match.
        assert_eq!(ex.extract("tres de la tarde", "fr", now()), None);
        assert_eq!(ex.extract("tres de la tarde", "en", now()), None);
    }

    #[test]
    fn test_no_time_yields_none() {
        let ex = extractor();
        assert_eq!(ex.extract("do you cut beards?", "en", now()), None);
        assert_eq!(ex.extract("tomorrow", "en", now()), None);
    }

    #[test]
    fn test_tomorrow_advances_date() {
        let ex = extractor();
        assert_eq!(
            ex.extract("tomorrow at 3 pm", "en", now()),
            Some(dt("2025-06-17 15:00"))
        );
        assert_eq!(
            ex.extract("mañana a las 15:00", "es", now()),
            Some(dt("2025-06-17 15:00"))
        );
        assert_eq!(
            ex.extract("demain, quinze heures", "fr", now()),
            Some(dt("2025-06-17 15:00"))
        );
        // Keyword from a different language is ignored.
        assert_eq!(
            ex.extract("demain at 3 pm", "en", now()),
            Some(dt("2025-06-16 15:00"))
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let ex = extractor();
        let first = ex.extract("tomorrow at 3 pm", "en", now());
        let second = ex.extract("tomorrow at 3 pm", "en", now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_registry_is_extensible() {
        let mut ex = extractor();
        ex.add_phrase("de", r"drei\s*uhr\s*nachmittags", 15, 0).unwrap();
        ex.add_tomorrow_keyword("de", "morgen");
        assert_eq!(
            ex.extract("morgen um drei uhr nachmittags", "de", now()),
            Some(dt("2025-06-17 15:00"))
        );
    }
}
