use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::access::rules;
use crate::attendance::engine::{self, AttendanceError};
use crate::attendance::geo::GeoPoint;
use crate::attendance::timesheet::{self, Period};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::AttendanceRecord;

/// Real client address. X-Forwarded-For is client-writable, so it is
/// consulted only when `trust_proxy` says a proxy we control sets it;
/// otherwise the allow-list sees the TCP peer address and a spoofed header
/// cannot defeat the network check.
fn client_ip(req: &HttpRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
        {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

/// Policy violations are 403, state violations 400, integrity failures 500.
/// Every body carries the code and detail so the client never re-derives.
fn rejection(e: &AttendanceError) -> HttpResponse {
    let body = json!({
        "code": e.code(),
        "message": e.to_string(),
        "details": e.details(),
    });

    match e {
        AttendanceError::NetworkNotPermitted { .. } | AttendanceError::OutsideGeofence { .. } => {
            HttpResponse::Forbidden().json(body)
        }
        AttendanceError::DuplicateCheckIn
        | AttendanceError::DuplicateCheckOut
        | AttendanceError::MissingCheckIn => HttpResponse::BadRequest().json(body),
        AttendanceError::NegativeWorkHours { .. } => HttpResponse::InternalServerError().json(body),
    }
}

async fn find_record(
    pool: &MySqlPool,
    employee_id: u64,
    date: &str,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, status, ip_address, lat, lng, work_hours
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

fn db_error(e: sqlx::Error, employee_id: u64, op: &'static str) -> actix_web::Error {
    tracing::error!(error = %e, employee_id, "{op} failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = 40.7128, nullable = true)]
    pub lat: Option<f64>,
    #[schema(example = -74.0060, nullable = true)]
    pub lng: Option<f64>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "code": "duplicate_check_in",
            "message": "already checked in today"
        })),
        (status = 403, description = "Outside the office network or geofence", body = Object, example = json!({
            "code": "outside_geofence",
            "message": "check-in denied: you are 2.31 km from the office (allowed: 0.1 km)"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::ATTENDANCE_SELF)?;
    let employee_id = auth.employee_id()?;

    let source_ip = client_ip(&req, config.trust_proxy);
    let claimed = match (payload.lat, payload.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    };

    if let Err(e) = engine::verify_location(&config.office, &source_ip, claimed) {
        tracing::info!(employee_id, code = e.code(), "Check-in rejected by policy");
        return Ok(rejection(&e));
    }

    let now = Local::now().naive_local();
    let today = engine::day_key(now.date());

    let existing = find_record(pool.get_ref(), employee_id, &today)
        .await
        .map_err(|e| db_error(e, employee_id, "Check-in lookup"))?;

    if let Err(e) = engine::ensure_can_check_in(existing.as_ref()) {
        return Ok(rejection(&e));
    }

    let status = engine::classify_check_in(now, config.office.late_after);

    // Upsert arbitrated by the unique (employee_id, date) index. A racing
    // second check-in finds check_in already set, updates nothing and loses;
    // a pre-materialized row with no check_in (an absent day) is claimed.
    // check_in is assigned last because MySQL applies the SET list in order
    // and the guards must still see the pre-update value.
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, status, ip_address, lat, lng)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            status = IF(check_in IS NULL, VALUES(status), status),
            ip_address = IF(check_in IS NULL, VALUES(ip_address), ip_address),
            lat = IF(check_in IS NULL, VALUES(lat), lat),
            lng = IF(check_in IS NULL, VALUES(lng), lng),
            check_in = IF(check_in IS NULL, VALUES(check_in), check_in)
        "#,
    )
    .bind(employee_id)
    .bind(&today)
    .bind(now)
    .bind(status)
    .bind(&source_ip)
    .bind(payload.lat)
    .bind(payload.lng)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, employee_id, "Check-in upsert"))?;

    if result.rows_affected() == 0 {
        return Ok(rejection(&AttendanceError::DuplicateCheckIn));
    }

    let record = find_record(pool.get_ref(), employee_id, &today)
        .await
        .map_err(|e| db_error(e, employee_id, "Check-in readback"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully",
        "record": record
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No check-in found or already checked out", body = Object, example = json!({
            "code": "missing_check_in",
            "message": "no check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::ATTENDANCE_SELF)?;
    let employee_id = auth.employee_id()?;

    let now = Local::now().naive_local();
    let today = engine::day_key(now.date());

    let existing = find_record(pool.get_ref(), employee_id, &today)
        .await
        .map_err(|e| db_error(e, employee_id, "Check-out lookup"))?;

    let check_in_at = match engine::ensure_can_check_out(existing.as_ref()) {
        Ok(at) => at,
        Err(e) => return Ok(rejection(&e)),
    };

    // Status stays whatever check-in set; a late morning is late all day.
    let hours = match engine::work_hours(check_in_at, now) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(employee_id, code = e.code(), "Check-out integrity failure");
            return Ok(rejection(&e));
        }
    };

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, work_hours = ?
        WHERE employee_id = ? AND date = ? AND check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(hours)
    .bind(employee_id)
    .bind(&today)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, employee_id, "Check-out update"))?;

    if result.rows_affected() == 0 {
        // Lost a race with a concurrent check-out.
        return Ok(rejection(&AttendanceError::DuplicateCheckOut));
    }

    let record = find_record(pool.get_ref(), employee_id, &today)
        .await
        .map_err(|e| db_error(e, employee_id, "Check-out readback"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "record": record
    })))
}

/// Today's attendance record, if any.
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record or null", body = Object, example = json!({
            "record": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::ATTENDANCE_SELF)?;
    let employee_id = auth.employee_id()?;

    let today = engine::day_key(Local::now().date_naive());
    let record = find_record(pool.get_ref(), employee_id, &today)
        .await
        .map_err(|e| db_error(e, employee_id, "Today lookup"))?;

    Ok(HttpResponse::Ok().json(json!({ "record": record })))
}

#[derive(Deserialize, IntoParams)]
pub struct TimesheetQuery {
    /// `week` (default) or `month`
    pub period: Option<Period>,
    /// Reference date inside the period; defaults to today
    #[param(example = "2026-08-26", value_type = String)]
    pub date: Option<NaiveDate>,
}

/// Own timesheet for the week/month around a reference date.
#[utoipa::path(
    get,
    path = "/api/attendance/my",
    params(TimesheetQuery),
    responses(
        (status = 200, description = "Records plus summary", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_timesheet(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TimesheetQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::ATTENDANCE_SELF)?;
    let employee_id = auth.employee_id()?;

    let period = query.period.unwrap_or_default();
    let reference = query.date.unwrap_or_else(|| Local::now().date_naive());
    let (start, end) = timesheet::period_bounds(period, reference);

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, status, ip_address, lat, lng, work_hours
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        ORDER BY date ASC
        "#,
    )
    .bind(employee_id)
    .bind(engine::day_key(start))
    .bind(engine::day_key(end))
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| db_error(e, employee_id, "Timesheet fetch"))?;

    let summary = timesheet::summarize(&records, period, start, end);

    Ok(HttpResponse::Ok().json(json!({
        "records": records,
        "summary": summary
    })))
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Deserialize, IntoParams)]
pub struct AttendanceFilter {
    /// Restrict to one employee
    pub employee_id: Option<u64>,
    /// Filter by status (present/late/absent)
    pub status: Option<String>,
    /// `week` or `month` (default)
    pub period: Option<Period>,
    /// Reference date inside the period; defaults to today
    #[param(example = "2026-08-26", value_type = String)]
    pub date: Option<NaiveDate>,
}

/// Company-wide attendance listing.
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Attendance records in the period", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::ATTENDANCE_LIST)?;

    let period = query.period.unwrap_or(Period::Month);
    let reference = query.date.unwrap_or_else(|| Local::now().date_naive());
    let (start, end) = timesheet::period_bounds(period, reference);

    let mut where_sql = String::from(" WHERE date BETWEEN ? AND ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, check_in, check_out, status, ip_address, lat, lng, work_hours
        FROM attendance
        {}
        ORDER BY date DESC, employee_id ASC
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql)
        .bind(engine::day_key(start))
        .bind(engine::day_key(end));
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s.to_owned()),
        };
    }

    let records = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch attendance list");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "records": records,
        "start_date": engine::day_key(start),
        "end_date": engine::day_key(end)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::net::SocketAddr;

    #[test]
    fn forwarded_header_needs_a_trusted_proxy() {
        let peer: SocketAddr = "203.0.113.9:443".parse().unwrap();
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "10.0.0.1"))
            .peer_addr(peer)
            .to_http_request();

        // A spoofed header from an untrusted network cannot put the caller
        // inside the office allow-list.
        assert_eq!(client_ip(&req, false), "203.0.113.9");
        assert_eq!(client_ip(&req, true), "10.0.0.1");
    }

    #[test]
    fn trusted_proxy_takes_the_first_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "198.51.100.7, 10.0.0.1"))
            .to_http_request();

        assert_eq!(client_ip(&req, true), "198.51.100.7");
    }

    #[test]
    fn empty_forwarded_header_falls_back_to_the_peer() {
        let peer: SocketAddr = "203.0.113.9:443".parse().unwrap();
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " "))
            .peer_addr(peer)
            .to_http_request();

        assert_eq!(client_ip(&req, true), "203.0.113.9");
    }
}
