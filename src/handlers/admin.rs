use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries::{self, SalesSummary};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = query.status.as_deref().map(parse_status).transpose()?;
    let limit = query.limit.unwrap_or(100);

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(&db, status.as_ref(), limit)?
    };
    Ok(Json(bookings))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = parse_status(&update.status)?;
    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_booking_status(&db, &id, &status)?
    };
    if !updated {
        return Err(AppError::NotFound(format!("booking {id}")));
    }

    Ok(Json(serde_json::json!({ "id": id, "status": status.as_str() })))
}

// GET /api/admin/sales
pub async fn get_sales(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SalesSummary>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let summary = {
        let db = state.db.lock().unwrap();
        queries::sales_summary(&db)?
    };
    Ok(Json(summary))
}

fn parse_status(s: &str) -> Result<BookingStatus, AppError> {
    match s {
        "pending" => Ok(BookingStatus::Pending),
        "completed" => Ok(BookingStatus::Completed),
        "no_show" => Ok(BookingStatus::NoShow),
        other => Err(AppError::BadRequest(format!("unknown status: {other}"))),
    }
}
