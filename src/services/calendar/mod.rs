pub mod google;

use async_trait::async_trait;
use chrono::NaiveDateTime;

/// A busy period reported by the calendar, decoded at the adapter boundary
/// so nothing downstream depends on provider field shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Whether the provider has the credentials it needs. Checked before any
    /// booking side effect so a misconfigured install fails loudly, not midway.
    fn is_configured(&self) -> bool;

    async fn list_busy(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<BusyInterval>>;

    /// Inserts an event and returns the provider's event id.
    async fn insert_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<String>;
}
