use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};

use crate::db::queries;
use crate::models::{Booking, BookingStatus, Caller};
use crate::services::language::localize;
use crate::services::scheduling::{self, Negotiation, SLOT_MINUTES};
use crate::state::AppState;

#[derive(Debug)]
pub enum BookingOutcome {
    Booked(Booking),
    /// The requested slot is busy; the user must resubmit with this time.
    Suggested(NaiveDateTime),
    Exhausted,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("caller is not authenticated")]
    Unauthenticated,

    #[error("calendar is not configured")]
    ConfigurationMissing,

    /// The calendar event exists but the local record could not be written.
    /// Surfaced distinctly so the dangling event is never reported as plain
    /// success or plain failure.
    #[error("calendar event {event_id} created but booking record failed")]
    PersistenceInconsistency {
        event_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Calendar(#[from] anyhow::Error),
}

/// Runs the ordered booking checks and, on a confirmed slot, performs the
/// calendar insert plus local booking write. No side effect happens before
/// every precondition has passed.
pub async fn place_booking(
    state: &Arc<AppState>,
    summary: &str,
    start: NaiveDateTime,
    caller: &Caller,
) -> Result<BookingOutcome, BookingError> {
    let Caller::Authenticated { id: user_id, display_name } = caller else {
        tracing::info!("unauthenticated booking attempt");
        return Err(BookingError::Unauthenticated);
    };

    if !state.calendar.is_configured() {
        tracing::error!("calendar provider is not configured");
        return Err(BookingError::ConfigurationMissing);
    }

    // The free/busy check and the event insert are separate provider calls;
    // the calendar does not arbitrate concurrent bookings between them.
    let duration = Duration::minutes(SLOT_MINUTES);
    match scheduling::negotiate(state.calendar.as_ref(), start, duration).await? {
        Negotiation::Suggested(alternative) => Ok(BookingOutcome::Suggested(alternative)),
        Negotiation::Exhausted => Ok(BookingOutcome::Exhausted),
        Negotiation::Confirmed(start) => {
            let event_summary = format!("{summary} for {display_name}");
            let event_id = state
                .calendar
                .insert_event(&event_summary, start, start + duration)
                .await?;

            let now = Utc::now().naive_utc();
            let booking = Booking {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.clone(),
                service_id: None,
                appointment_time: start,
                status: BookingStatus::Pending,
                calendar_event_id: Some(event_id.clone()),
                created_at: now,
                updated_at: now,
            };

            let persisted = {
                let db = state.db.lock().unwrap();
                queries::create_booking(&db, &booking)
            };
            if let Err(e) = persisted {
                tracing::error!(
                    error = %e,
                    event_id = %event_id,
                    "booking record failed after calendar insert"
                );
                return Err(BookingError::PersistenceInconsistency {
                    event_id,
                    source: e,
                });
            }

            tracing::info!(
                booking_id = %booking.id,
                event_id = %event_id,
                start = %start,
                "booking created"
            );
            Ok(BookingOutcome::Booked(booking))
        }
    }
}

/// Books an appointment and renders the outcome as a localized message.
/// Every path ends in a user-facing string; no fault escapes.
pub async fn book(
    state: &Arc<AppState>,
    summary: &str,
    start: NaiveDateTime,
    caller: &Caller,
    lang: &str,
) -> String {
    let summary = localize(state.translator.as_ref(), summary, lang).await;

    let message = match place_booking(state, &summary, start, caller).await {
        Ok(BookingOutcome::Booked(booking)) => format!(
            "Your appointment is booked at {} on {}. Please come on time.",
            fmt_time(booking.appointment_time),
            fmt_date(booking.appointment_time),
        ),
        Ok(BookingOutcome::Suggested(alternative)) => format!(
            "That time is already booked. How about {} on {}?",
            fmt_time(alternative),
            fmt_date(alternative),
        ),
        Ok(BookingOutcome::Exhausted) => {
            "Sorry, no available slots in the next few hours.".to_string()
        }
        Err(BookingError::Unauthenticated) => {
            "You need to log in to book an appointment. Please log in and try again.".to_string()
        }
        Err(BookingError::ConfigurationMissing) => {
            "Booking is unavailable right now: the calendar is not configured. Please contact the administrator."
                .to_string()
        }
        Err(BookingError::PersistenceInconsistency { event_id, .. }) => format!(
            "Your appointment was added to the calendar, but we could not save it on our side. Please contact us and mention reference {event_id}.",
        ),
        Err(BookingError::Calendar(e)) => {
            tracing::error!(error = %e, "booking failed");
            format!("Error booking appointment: {e}")
        }
    };

    localize(state.translator.as_ref(), &message, lang).await
}

fn fmt_time(dt: NaiveDateTime) -> String {
    dt.format("%I:%M %p").to_string()
}

fn fmt_date(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}
