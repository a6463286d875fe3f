use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::{access::rules, auth::auth::AuthUser, model::salary::Salary};

#[derive(Deserialize, ToSchema)]
pub struct CreateSalary {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 10)]
    pub department_id: u64,
    #[schema(example = 52000.0)]
    pub basic: f64,
    #[schema(example = 4000.0, nullable = true)]
    pub allowance: Option<f64>,
    #[schema(example = 1500.0, nullable = true)]
    pub deductions: Option<f64>,
    #[schema(example = "2026-08-01", format = "date", value_type = String)]
    pub pay_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SalaryQuery {
    /// Restrict to one employee
    pub employee_id: Option<u64>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

const SALARY_COLUMNS: &str =
    "id, employee_id, department_id, basic, allowance, deductions, net_salary, pay_date";

/// Create Salary record
#[utoipa::path(
    post,
    path = "/api/salary",
    request_body = CreateSalary,
    responses(
        (status = 201, description = "Salary record created", body = Object, example = json!({
            "message": "Salary record created"
        })),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Salary",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::SALARY_CREATE)?;

    let allowance = payload.allowance.unwrap_or(0.0);
    let deductions = payload.deductions.unwrap_or(0.0);
    let net_salary = payload.basic + allowance - deductions;

    sqlx::query(
        r#"
        INSERT INTO salaries
            (employee_id, department_id, basic, allowance, deductions, net_salary, pay_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.department_id)
    .bind(payload.basic)
    .bind(allowance)
    .bind(deductions)
    .bind(net_salary)
    .bind(payload.pay_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to create salary record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Salary record created"
    })))
}

/// List Salary records
#[utoipa::path(
    get,
    path = "/api/salary",
    params(SalaryQuery),
    responses(
        (status = 200, description = "Salary records, newest pay date first", body = [Salary]),
        (status = 403, description = "Forbidden")
    ),
    tag = "Salary",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SalaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require(&rules::SALARY_LIST)?;

    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let (where_sql, employee_filter) = match query.employee_id {
        Some(id) => (" WHERE employee_id = ?", Some(id)),
        None => ("", None),
    };

    let data_sql = format!(
        "SELECT {SALARY_COLUMNS} FROM salaries{} ORDER BY pay_date DESC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Salary>(&data_sql);
    if let Some(id) = employee_filter {
        data_q = data_q.bind(id);
    }

    let salaries = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch salary list");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(salaries))
}

/// Own latest salary record (self-scoped)
#[utoipa::path(
    get,
    path = "/api/salary/my",
    responses(
        (status = 200, description = "Latest own salary record", body = Salary),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Salary record not found", body = Object, example = json!({
            "message": "Salary record not found"
        }))
    ),
    tag = "Salary",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    auth.require_owned(&rules::SALARY_VIEW_OWN, employee_id)?;

    let salary = sqlx::query_as::<_, Salary>(&format!(
        "SELECT {SALARY_COLUMNS} FROM salaries WHERE employee_id = ? ORDER BY pay_date DESC LIMIT 1"
    ))
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch own salary");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match salary {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Salary record not found"
        }))),
    }
}
