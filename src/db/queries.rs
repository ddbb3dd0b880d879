use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingStatus, Faq, ServiceItem, User};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Users ──

pub fn get_user_by_token(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, display_name FROM users WHERE session_token = ?1",
            params![token],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn create_user(
    conn: &Connection,
    user: &User,
    session_token: Option<&str>,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, display_name, session_token) VALUES (?1, ?2, ?3, ?4)",
        params![user.id, user.username, user.display_name, session_token],
    )?;
    Ok(())
}

// ── Catalog ──

pub fn list_services(conn: &Connection) -> anyhow::Result<Vec<ServiceItem>> {
    let mut stmt = conn.prepare("SELECT id, name, price FROM services ORDER BY name")?;
    let services = stmt
        .query_map([], |row| {
            Ok(ServiceItem {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(services)
}

pub fn list_faqs(conn: &Connection) -> anyhow::Result<Vec<Faq>> {
    let mut stmt = conn.prepare("SELECT id, question, answer FROM faqs ORDER BY id")?;
    let faqs = stmt
        .query_map([], |row| {
            Ok(Faq {
                id: row.get(0)?,
                question: row.get(1)?,
                answer: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(faqs)
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, user_id, service_id, appointment_time, status, calendar_event_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.id,
            booking.user_id,
            booking.service_id,
            booking.appointment_time.format(DATETIME_FORMAT).to_string(),
            booking.status.as_str(),
            booking.calendar_event_id,
            booking.created_at.format(DATETIME_FORMAT).to_string(),
            booking.updated_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            "SELECT id, user_id, service_id, appointment_time, status, calendar_event_id, created_at, updated_at
             FROM bookings WHERE id = ?1",
            params![id],
            row_to_booking,
        )
        .optional()?;
    Ok(booking)
}

pub fn list_bookings(
    conn: &Connection,
    status: Option<&BookingStatus>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut sql = String::from(
        "SELECT id, user_id, service_id, appointment_time, status, calendar_event_id, created_at, updated_at
         FROM bookings",
    );
    if status.is_some() {
        sql.push_str(" WHERE status = ?1");
    }
    sql.push_str(" ORDER BY appointment_time DESC LIMIT ");
    sql.push_str(&limit.to_string());

    let mut stmt = conn.prepare(&sql)?;
    let rows = match status {
        Some(s) => stmt.query_map(params![s.as_str()], row_to_booking)?,
        None => stmt.query_map([], row_to_booking)?,
    };
    let bookings = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(DATETIME_FORMAT).to_string();
    let changed = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(changed > 0)
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SalesSummary {
    pub completed_count: i64,
    pub revenue: f64,
}

pub fn sales_summary(conn: &Connection) -> anyhow::Result<SalesSummary> {
    let summary = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(s.price), 0.0)
         FROM bookings b
         LEFT JOIN services s ON b.service_id = s.id
         WHERE b.status = 'completed'",
        [],
        |row| {
            Ok(SalesSummary {
                completed_count: row.get(0)?,
                revenue: row.get(1)?,
            })
        },
    )?;
    Ok(summary)
}

fn row_to_booking(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    let appointment_time: String = row.get(3)?;
    let status: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        service_id: row.get(2)?,
        appointment_time: parse_datetime(&appointment_time),
        status: BookingStatus::from_str(&status),
        calendar_event_id: row.get(5)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn make_booking(id: &str, user_id: &str) -> Booking {
        let now = Utc::now().naive_utc();
        Booking {
            id: id.to_string(),
            user_id: user_id.to_string(),
            service_id: None,
            appointment_time: dt("2025-06-16 15:00"),
            status: BookingStatus::Pending,
            calendar_event_id: Some("evt-1".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_seed_catalog_present() {
        let conn = setup_db();
        let services = list_services(&conn).unwrap();
        assert!(!services.is_empty());
        let faqs = list_faqs(&conn).unwrap();
        assert!(!faqs.is_empty());
    }

    #[test]
    fn test_user_token_lookup() {
        let conn = setup_db();
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
        };
        create_user(&conn, &user, Some("tok-1")).unwrap();

        let found = get_user_by_token(&conn, "tok-1").unwrap().unwrap();
        assert_eq!(found.display_name, "Alice");
        assert!(get_user_by_token(&conn, "tok-2").unwrap().is_none());
    }

    #[test]
    fn test_booking_roundtrip_and_status_update() {
        let conn = setup_db();
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
        };
        create_user(&conn, &user, None).unwrap();
        create_booking(&conn, &make_booking("bk-1", "u1")).unwrap();

        let loaded = get_booking_by_id(&conn, "bk-1").unwrap().unwrap();
        assert_eq!(loaded.status, BookingStatus::Pending);
        assert_eq!(loaded.calendar_event_id.as_deref(), Some("evt-1"));
        assert_eq!(loaded.appointment_time, dt("2025-06-16 15:00"));

        assert!(update_booking_status(&conn, "bk-1", &BookingStatus::NoShow).unwrap());
        let loaded = get_booking_by_id(&conn, "bk-1").unwrap().unwrap();
        assert_eq!(loaded.status, BookingStatus::NoShow);

        assert!(!update_booking_status(&conn, "missing", &BookingStatus::Completed).unwrap());
    }

    #[test]
    fn test_booking_requires_existing_user() {
        let conn = setup_db();
        let result = create_booking(&conn, &make_booking("bk-1", "ghost"));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_bookings_status_filter() {
        let conn = setup_db();
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
        };
        create_user(&conn, &user, None).unwrap();
        create_booking(&conn, &make_booking("bk-1", "u1")).unwrap();
        create_booking(&conn, &make_booking("bk-2", "u1")).unwrap();
        update_booking_status(&conn, "bk-2", &BookingStatus::Completed).unwrap();

        let all = list_bookings(&conn, None, 50).unwrap();
        assert_eq!(all.len(), 2);

        let completed = list_bookings(&conn, Some(&BookingStatus::Completed), 50).unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, "bk-2");
    }

    #[test]
    fn test_sales_summary_counts_completed_only() {
        let conn = setup_db();
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
        };
        create_user(&conn, &user, None).unwrap();

        let mut with_service = make_booking("bk-1", "u1");
        with_service.service_id = Some("svc-haircut".to_string());
        create_booking(&conn, &with_service).unwrap();
        create_booking(&conn, &make_booking("bk-2", "u1")).unwrap();

        // Nothing completed yet.
        let summary = sales_summary(&conn).unwrap();
        assert_eq!(summary.completed_count, 0);
        assert_eq!(summary.revenue, 0.0);

        update_booking_status(&conn, "bk-1", &BookingStatus::Completed).unwrap();
        let summary = sales_summary(&conn).unwrap();
        assert_eq!(summary.completed_count, 1);
        assert!((summary.revenue - 25.0).abs() < f64::EPSILON);
    }
}
