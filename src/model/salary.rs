use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Salary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 10)]
    pub department_id: u64,
    #[schema(example = 52000.0)]
    pub basic: f64,
    #[schema(example = 4000.0)]
    pub allowance: f64,
    #[schema(example = 1500.0)]
    pub deductions: f64,
    /// basic + allowance - deductions, fixed at creation time
    #[schema(example = 54500.0)]
    pub net_salary: f64,
    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub pay_date: NaiveDate,
}
