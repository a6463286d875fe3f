use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Fine-grained capability tags, orthogonal to [`Role`](super::role::Role).
///
/// A tag lets an otherwise unprivileged role perform one narrow operation
/// without being promoted wholesale.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    DeleteRecords,
    ViewSalary,
    ManageSalary,
    ManageLeaves,
}
