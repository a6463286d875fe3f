use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Closed set of roles an account can hold. Exactly one role per account.
///
/// `Admin` is a universal override: it satisfies every role check and every
/// permission check without holding explicit permission grants.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Hr,
    Finance,
    ItAdmin,
    Employee,
}
