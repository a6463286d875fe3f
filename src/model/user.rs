use sqlx::FromRow;

/// Account row as stored in `users`. `permissions` is a JSON array of
/// permission tags, `employee_id` is set only for accounts linked to an
/// employee profile.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub permissions: Option<String>,
    pub employee_id: Option<u64>,
}
