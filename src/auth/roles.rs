// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `SuperAdmin` - Full access, outranks every other role
/// - `Admin` - User management, catalog administration, analytics
/// - `Moderator` - Application review queue
/// - `Student` - Normal user: browse, apply, review, pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Normal user (applies for scholarships)
    Student,
    /// Application reviewer
    Moderator,
    /// Administrative access
    Admin,
    /// Highest privilege, outranks Admin
    SuperAdmin,
}

impl Role {
    /// Numeric rank for privilege comparisons. Higher outranks lower.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Student => 0,
            Role::Moderator => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    /// Check if this role has at least the privileges of the required role.
    ///
    /// The hierarchy is strictly linear: every role covers the roles
    /// below it.
    pub fn has_privilege(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl Default for Role {
    /// Default role is Student (least privilege for authenticated users).
    fn default() -> Self {
        Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Moderator => write!(f, "moderator"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "superadmin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_has_all_privileges() {
        assert!(Role::SuperAdmin.has_privilege(Role::SuperAdmin));
        assert!(Role::SuperAdmin.has_privilege(Role::Admin));
        assert!(Role::SuperAdmin.has_privilege(Role::Moderator));
        assert!(Role::SuperAdmin.has_privilege(Role::Student));
    }

    #[test]
    fn admin_outranks_moderator_but_not_super_admin() {
        assert!(Role::Admin.has_privilege(Role::Moderator));
        assert!(Role::Admin.has_privilege(Role::Student));
        assert!(!Role::Admin.has_privilege(Role::SuperAdmin));
    }

    #[test]
    fn student_only_has_student_privilege() {
        assert!(Role::Student.has_privilege(Role::Student));
        assert!(!Role::Student.has_privilege(Role::Moderator));
        assert!(!Role::Student.has_privilege(Role::Admin));
        assert!(!Role::Student.has_privilege(Role::SuperAdmin));
    }

    #[test]
    fn default_role_is_student() {
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn serde_round_trip_uses_lowercase() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, r#""superadmin""#);
        let parsed: Role = serde_json::from_str(r#""moderator""#).unwrap();
        assert_eq!(parsed, Role::Moderator);
    }
}
