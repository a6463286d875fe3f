//! Access control evaluation.
//!
//! Every protected operation declares one [`AccessRule`] in [`rules`] and
//! asks [`evaluate`] (or [`evaluate_owned`] for actor-owned data) before it
//! runs. Role membership and permission membership are independent axes: a
//! rule is satisfied by coarse role OR fine permission, never both at once.
//! Admin wins unconditionally and is checked first, so the override cannot
//! be lost to a misconfigured rule.

use std::collections::HashSet;

use crate::model::{permission::Permission, role::Role};

/// The authenticated identity attached to a request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub role: Role,
    pub permissions: HashSet<Permission>,
    /// Present only for accounts linked to an employee profile; scopes
    /// self-service operations (own attendance, own leave, own salary).
    pub employee_id: Option<u64>,
}

/// Per-operation authorization requirement, defined once at configuration
/// time in [`rules`]. Not persisted.
#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    pub allowed_roles: &'static [Role],
    pub required_permission: Option<Permission>,
}

impl AccessRule {
    pub const fn roles(allowed_roles: &'static [Role]) -> Self {
        Self {
            allowed_roles,
            required_permission: None,
        }
    }

    pub const fn roles_or(allowed_roles: &'static [Role], permission: Permission) -> Self {
        Self {
            allowed_roles,
            required_permission: Some(permission),
        }
    }
}

/// Why an operation was denied. Carries enough detail for the HTTP layer to
/// render an actionable message without re-deriving anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    #[error("role `{role}` is not permitted for this operation")]
    RoleDenied { role: Role },

    #[error("role `{role}` is not permitted and permission `{permission}` is missing")]
    PermissionDenied { role: Role, permission: Permission },

    #[error("this record belongs to another employee")]
    NotResourceOwner,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::RoleDenied { .. } => "role_denied",
            DenyReason::PermissionDenied { .. } => "permission_denied",
            DenyReason::NotResourceOwner => "not_resource_owner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Pure decision function: (actor, rule) -> Allow | Deny(reason).
///
/// Short-circuits in order: admin override, role membership, permission
/// membership. The deny reason distinguishes "role not permitted" from
/// "role not permitted and required permission absent" (the latter only when
/// the rule configured a permission at all).
pub fn evaluate(actor: &Actor, rule: &AccessRule) -> Decision {
    if actor.role == Role::Admin {
        return Decision::Allow;
    }

    if rule.allowed_roles.contains(&actor.role) {
        return Decision::Allow;
    }

    if let Some(permission) = rule.required_permission {
        if actor.permissions.contains(&permission) {
            return Decision::Allow;
        }
        return Decision::Deny(DenyReason::PermissionDenied {
            role: actor.role,
            permission,
        });
    }

    Decision::Deny(DenyReason::RoleDenied { role: actor.role })
}

/// Variant for actor-owned resources. Role/permission evaluation runs first;
/// ownership (`actor.employee_id == owner_employee_id`) is a second,
/// independent check, never a substitute. Admin bypasses ownership as well.
pub fn evaluate_owned(actor: &Actor, rule: &AccessRule, owner_employee_id: u64) -> Decision {
    match evaluate(actor, rule) {
        Decision::Deny(reason) => Decision::Deny(reason),
        Decision::Allow => {
            if actor.role == Role::Admin || actor.employee_id == Some(owner_employee_id) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotResourceOwner)
            }
        }
    }
}

/// Every rule in the system, centralized so call sites cannot drift.
pub mod rules {
    use super::AccessRule;
    use crate::model::{permission::Permission, role::Role};

    /// Admin override only; no role or permission can satisfy this.
    pub const ADMIN_ONLY: AccessRule = AccessRule::roles(&[]);

    pub const EMPLOYEE_CREATE: AccessRule =
        AccessRule::roles_or(&[Role::Hr], Permission::ManageUsers);
    pub const EMPLOYEE_LIST: AccessRule = AccessRule::roles(&[Role::Hr, Role::ItAdmin]);
    pub const EMPLOYEE_VIEW: AccessRule =
        AccessRule::roles(&[Role::Hr, Role::ItAdmin, Role::Employee]);
    pub const EMPLOYEE_UPDATE: AccessRule =
        AccessRule::roles_or(&[Role::Hr], Permission::ManageUsers);
    pub const EMPLOYEE_DELETE: AccessRule =
        AccessRule::roles_or(&[Role::ItAdmin], Permission::DeleteRecords);

    pub const DEPARTMENT_MANAGE: AccessRule =
        AccessRule::roles_or(&[Role::Hr], Permission::ManageUsers);
    pub const DEPARTMENT_VIEW: AccessRule =
        AccessRule::roles(&[Role::Hr, Role::Finance, Role::ItAdmin, Role::Employee]);

    pub const LEAVE_REQUEST: AccessRule = AccessRule::roles(&[Role::Employee]);
    pub const LEAVE_VIEW_OWN: AccessRule = AccessRule::roles(&[Role::Employee]);
    pub const LEAVE_LIST: AccessRule = AccessRule::roles_or(&[Role::Hr], Permission::ManageLeaves);
    pub const LEAVE_DECIDE: AccessRule =
        AccessRule::roles_or(&[Role::Hr], Permission::ManageLeaves);

    pub const SALARY_CREATE: AccessRule =
        AccessRule::roles_or(&[Role::Finance], Permission::ManageSalary);
    pub const SALARY_LIST: AccessRule =
        AccessRule::roles_or(&[Role::Finance], Permission::ViewSalary);
    pub const SALARY_VIEW_OWN: AccessRule = AccessRule::roles(&[Role::Employee, Role::Finance]);

    pub const ATTENDANCE_SELF: AccessRule = AccessRule::roles(&[Role::Employee]);
    pub const ATTENDANCE_LIST: AccessRule = ADMIN_ONLY;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, permissions: &[Permission], employee_id: Option<u64>) -> Actor {
        Actor {
            role,
            permissions: permissions.iter().copied().collect(),
            employee_id,
        }
    }

    #[test]
    fn admin_allows_regardless_of_rule() {
        let admin = actor(Role::Admin, &[], None);

        let empty = AccessRule::roles(&[]);
        let narrow = AccessRule::roles_or(&[Role::Finance], Permission::ManageSalary);

        assert_eq!(evaluate(&admin, &empty), Decision::Allow);
        assert_eq!(evaluate(&admin, &narrow), Decision::Allow);
        assert_eq!(evaluate(&admin, &rules::ADMIN_ONLY), Decision::Allow);
    }

    #[test]
    fn role_membership_allows() {
        let hr = actor(Role::Hr, &[], None);
        assert_eq!(evaluate(&hr, &rules::EMPLOYEE_LIST), Decision::Allow);
    }

    #[test]
    fn permission_allows_without_role() {
        let emp = actor(Role::Employee, &[Permission::ManageUsers], None);
        assert_eq!(evaluate(&emp, &rules::EMPLOYEE_CREATE), Decision::Allow);
    }

    #[test]
    fn deny_reports_missing_permission_when_one_is_configured() {
        let emp = actor(Role::Employee, &[], None);
        assert_eq!(
            evaluate(&emp, &rules::EMPLOYEE_CREATE),
            Decision::Deny(DenyReason::PermissionDenied {
                role: Role::Employee,
                permission: Permission::ManageUsers,
            })
        );
    }

    #[test]
    fn deny_reports_role_only_when_no_permission_configured() {
        let finance = actor(Role::Finance, &[Permission::ViewSalary], None);
        assert_eq!(
            evaluate(&finance, &rules::EMPLOYEE_LIST),
            Decision::Deny(DenyReason::RoleDenied {
                role: Role::Finance
            })
        );
    }

    #[test]
    fn unrelated_permission_does_not_satisfy_rule() {
        let emp = actor(Role::Employee, &[Permission::ViewSalary], None);
        assert!(!evaluate(&emp, &rules::EMPLOYEE_CREATE).is_allow());
    }

    #[test]
    fn admin_only_rule_denies_every_other_role() {
        for role in [Role::Hr, Role::Finance, Role::ItAdmin, Role::Employee] {
            let a = actor(
                role,
                &[Permission::ManageUsers, Permission::DeleteRecords],
                Some(1),
            );
            assert!(!evaluate(&a, &rules::ADMIN_ONLY).is_allow());
        }
    }

    #[test]
    fn ownership_is_checked_after_role() {
        let owner = actor(Role::Employee, &[], Some(7));
        let other = actor(Role::Employee, &[], Some(8));
        let unlinked = actor(Role::Employee, &[], None);

        assert_eq!(
            evaluate_owned(&owner, &rules::LEAVE_VIEW_OWN, 7),
            Decision::Allow
        );
        assert_eq!(
            evaluate_owned(&other, &rules::LEAVE_VIEW_OWN, 7),
            Decision::Deny(DenyReason::NotResourceOwner)
        );
        assert_eq!(
            evaluate_owned(&unlinked, &rules::LEAVE_VIEW_OWN, 7),
            Decision::Deny(DenyReason::NotResourceOwner)
        );
    }

    #[test]
    fn ownership_never_substitutes_for_role() {
        // Finance owns the record but LEAVE_VIEW_OWN only admits employees.
        let finance = actor(Role::Finance, &[], Some(7));
        assert_eq!(
            evaluate_owned(&finance, &rules::LEAVE_VIEW_OWN, 7),
            Decision::Deny(DenyReason::RoleDenied {
                role: Role::Finance
            })
        );
    }

    #[test]
    fn admin_bypasses_ownership() {
        let admin = actor(Role::Admin, &[], None);
        assert_eq!(
            evaluate_owned(&admin, &rules::LEAVE_VIEW_OWN, 7),
            Decision::Allow
        );
    }
}
