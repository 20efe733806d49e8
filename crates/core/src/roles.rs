//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in the users migration.

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_CREATOR: &str = "creator";
pub const ROLE_ADMIN: &str = "admin";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_CREATOR, ROLE_ADMIN];

/// Roles a user may pick for themselves at registration.
pub const SELF_ASSIGNABLE_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_CREATOR];

/// Validate a role requested during self-registration.
///
/// `None` means the default (`student`). Admin accounts can only be granted
/// by an existing admin.
pub fn resolve_registration_role(requested: Option<&str>) -> Result<&'static str, CoreError> {
    match requested {
        None => Ok(ROLE_STUDENT),
        Some(role) => SELF_ASSIGNABLE_ROLES
            .iter()
            .copied()
            .find(|r| *r == role)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid role '{role}'. Must be one of: {}",
                    SELF_ASSIGNABLE_ROLES.join(", ")
                ))
            }),
    }
}

/// Whether the role may author courses and creator tooling.
pub fn is_creator_or_admin(role: &str) -> bool {
    role == ROLE_CREATOR || role == ROLE_ADMIN
}
