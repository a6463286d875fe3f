use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// Value that can be bound into a MySQL statement.
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl SqlValue {
    /// Map a JSON value to its SQL binding. Date-looking strings are bound
    /// as dates so MySQL compares them natively.
    fn from_json(value: &Value) -> Result<Self, actix_web::Error> {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    Ok(SqlValue::Date(d))
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    Ok(SqlValue::DateTime(dt))
                } else {
                    Ok(SqlValue::String(s.clone()))
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::I64(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(SqlValue::F64(f))
                } else {
                    Err(ErrorBadRequest("Unsupported numeric value"))
                }
            }
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::Null => Ok(SqlValue::Null),
            _ => Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }
}

/// Dynamic UPDATE statement plus its bindings, in column order.
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build `UPDATE <table> SET <k> = ?, ... WHERE <id_column> = ?` from a flat
/// JSON object of column/value pairs.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    // Column names come from the request body; only plain identifiers may
    // reach the SQL text.
    if let Some(bad) = obj
        .keys()
        .find(|k| k.is_empty() || !k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    {
        return Err(ErrorBadRequest(format!("Invalid column name: {bad}")));
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);
    for value in obj.values() {
        values.push(SqlValue::from_json(value)?);
    }
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binds_typed_values_and_the_id_last() {
        let update = build_update_sql(
            "employees",
            &json!({ "designation": "Lead", "hire_date": "2026-01-01" }),
            "id",
            42,
        )
        .unwrap();

        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.ends_with(" WHERE id = ?"));
        assert!(update.sql.contains("designation = ?"));
        assert!(update.sql.contains("hire_date = ?"));

        assert_eq!(update.values.len(), 3);
        assert!(
            update
                .values
                .iter()
                .any(|v| matches!(v, SqlValue::Date(_))),
            "date-looking strings bind as dates"
        );
        assert!(matches!(update.values.last(), Some(SqlValue::U64(42))));
    }

    #[test]
    fn rejects_non_identifier_column_names() {
        let payload = json!({ "designation = 'x', role": "admin" });
        assert!(build_update_sql("employees", &payload, "id", 1).is_err());
    }

    #[test]
    fn rejects_empty_payloads() {
        assert!(build_update_sql("employees", &json!({}), "id", 1).is_err());
        assert!(build_update_sql("employees", &json!([1, 2]), "id", 1).is_err());
    }
}
