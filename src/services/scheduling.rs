use chrono::{Duration, NaiveDateTime};

use crate::models::{AvailabilitySlot, SlotStatus};
use crate::services::calendar::CalendarProvider;

/// Default appointment length.
pub const SLOT_MINUTES: i64 = 60;

/// How many hour-long windows are probed after the requested one.
const PROBE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Negotiation {
    /// The requested window is free.
    Confirmed(NaiveDateTime),
    /// The requested window is busy; this later window is free. Nothing is
    /// booked until the user asks again with the new time.
    Suggested(NaiveDateTime),
    /// The requested window and every probed window are busy.
    Exhausted,
}

/// Finds a free slot starting from the requested time, probing forward
/// hour-by-hour. Each probe is an independent point query against the
/// provider; a provider failure is an error, never treated as availability.
pub async fn negotiate(
    calendar: &dyn CalendarProvider,
    start: NaiveDateTime,
    duration: Duration,
) -> anyhow::Result<Negotiation> {
    let requested = check_slot(calendar, start, duration).await;
    match requested.status {
        SlotStatus::Free => return Ok(Negotiation::Confirmed(start)),
        SlotStatus::Unknown => {
            anyhow::bail!("calendar unavailable while checking {start}")
        }
        SlotStatus::Busy => {}
    }

    let mut candidate = start + duration;
    for _ in 0..PROBE_LIMIT {
        let slot = check_slot(calendar, candidate, duration).await;
        match slot.status {
            SlotStatus::Free => return Ok(Negotiation::Suggested(candidate)),
            SlotStatus::Unknown => {
                anyhow::bail!("calendar unavailable while probing {candidate}")
            }
            SlotStatus::Busy => candidate += duration,
        }
    }

    Ok(Negotiation::Exhausted)
}

async fn check_slot(
    calendar: &dyn CalendarProvider,
    start: NaiveDateTime,
    duration: Duration,
) -> AvailabilitySlot {
    let end = start + duration;
    let status = match calendar.list_busy(start, end).await {
        Ok(busy) if busy.is_empty() => SlotStatus::Free,
        Ok(_) => SlotStatus::Busy,
        Err(e) => {
            tracing::error!(error = %e, start = %start, "free/busy lookup failed");
            SlotStatus::Unknown
        }
    };

    AvailabilitySlot { start, end, status }
}
