use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{BusyInterval, CalendarProvider};

pub struct GoogleCalendarProvider {
    calendar_id: String,
    access_token: String,
    timezone: String,
    client: reqwest::Client,
}

impl GoogleCalendarProvider {
    pub fn new(calendar_id: String, access_token: String, timezone: String) -> Self {
        Self {
            calendar_id,
            access_token,
            timezone,
            client: reqwest::Client::new(),
        }
    }

    fn format_instant(dt: NaiveDateTime) -> String {
        format!("{}Z", dt.format("%Y-%m-%dT%H:%M:%S"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest<'a> {
    time_min: String,
    time_max: String,
    time_zone: &'a str,
    items: Vec<FreeBusyItem<'a>>,
}

#[derive(Serialize)]
struct FreeBusyItem<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, CalendarBusy>,
}

#[derive(Deserialize, Default)]
struct CalendarBusy {
    #[serde(default)]
    busy: Vec<BusyPeriod>,
}

#[derive(Deserialize)]
struct BusyPeriod {
    start: String,
    end: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventResource<'a> {
    summary: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Deserialize)]
struct InsertedEvent {
    id: String,
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    fn is_configured(&self) -> bool {
        !self.calendar_id.is_empty() && !self.access_token.is_empty()
    }

    async fn list_busy(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<BusyInterval>> {
        let body = FreeBusyRequest {
            time_min: Self::format_instant(start),
            time_max: Self::format_instant(end),
            time_zone: &self.timezone,
            items: vec![FreeBusyItem {
                id: &self.calendar_id,
            }],
        };

        let resp = self
            .client
            .post("https://www.googleapis.com/calendar/v3/freeBusy")
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("failed to call Calendar freeBusy API")?
            .error_for_status()
            .context("Calendar freeBusy API returned error")?;

        let data: FreeBusyResponse = resp
            .json()
            .await
            .context("failed to parse freeBusy response")?;

        let periods = data
            .calendars
            .get(&self.calendar_id)
            .map(|c| c.busy.as_slice())
            .unwrap_or_default();

        periods
            .iter()
            .map(|p| {
                Ok(BusyInterval {
                    start: parse_rfc3339(&p.start)?,
                    end: parse_rfc3339(&p.end)?,
                })
            })
            .collect()
    }

    async fn insert_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<String> {
        let url = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            self.calendar_id
        );
        let body = EventResource {
            summary,
            start: EventTime {
                date_time: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: &self.timezone,
            },
            end: EventTime {
                date_time: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: &self.timezone,
            },
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("failed to call Calendar insert API")?
            .error_for_status()
            .context("Calendar insert API returned error")?;

        let event: InsertedEvent = resp
            .json()
            .await
            .context("failed to parse inserted event response")?;

        Ok(event.id)
    }
}

fn parse_rfc3339(s: &str) -> anyhow::Result<NaiveDateTime> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid busy period timestamp: {s}"))?;
    Ok(parsed.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        let provider = GoogleCalendarProvider::new(
            "shop@example.com".to_string(),
            "token".to_string(),
            "Asia/Kathmandu".to_string(),
        );
        assert!(provider.is_configured());

        let missing_token = GoogleCalendarProvider::new(
            "shop@example.com".to_string(),
            String::new(),
            "Asia/Kathmandu".to_string(),
        );
        assert!(!missing_token.is_configured());
    }

    #[test]
    fn test_parse_busy_period_timestamp() {
        let dt = parse_rfc3339("2025-06-16T15:00:00+05:45").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "15:00");
        assert!(parse_rfc3339("not a timestamp").is_err());
    }

    #[test]
    fn test_freebusy_response_decodes_without_busy_field() {
        let json = r#"{"calendars":{"shop@example.com":{}}}"#;
        let resp: FreeBusyResponse = serde_json::from_str(json).unwrap();
        assert!(resp.calendars["shop@example.com"].busy.is_empty());
    }
}
