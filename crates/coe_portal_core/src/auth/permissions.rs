//! Role capability table.
//!
//! # Invariants
//! - Lookups are pure and fail closed: unknown role or capability -> `false`.
//! - The table is static; it has no lifecycle beyond process start.

use crate::model::user::Role;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Capability flag consulted before a mutation is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    SubmitProject,
    ViewOwnProjects,
    ApproveProjects,
    ManageUsers,
    CreateEvents,
}

/// Table key for submit-project capability.
pub const CAPABILITY_SUBMIT_PROJECT: &str = "canSubmitProject";
/// Table key for view-own-projects capability.
pub const CAPABILITY_VIEW_OWN_PROJECTS: &str = "canViewOwnProjects";
/// Table key for approve-projects capability.
pub const CAPABILITY_APPROVE_PROJECTS: &str = "canApproveProjects";
/// Table key for manage-users capability.
pub const CAPABILITY_MANAGE_USERS: &str = "canManageUsers";
/// Table key for create-events capability.
pub const CAPABILITY_CREATE_EVENTS: &str = "canCreateEvents";

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::SubmitProject,
        Capability::ViewOwnProjects,
        Capability::ApproveProjects,
        Capability::ManageUsers,
        Capability::CreateEvents,
    ];

    /// Stable table key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmitProject => CAPABILITY_SUBMIT_PROJECT,
            Self::ViewOwnProjects => CAPABILITY_VIEW_OWN_PROJECTS,
            Self::ApproveProjects => CAPABILITY_APPROVE_PROJECTS,
            Self::ManageUsers => CAPABILITY_MANAGE_USERS,
            Self::CreateEvents => CAPABILITY_CREATE_EVENTS,
        }
    }

    /// Parses an exact table key.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == value)
    }
}

/// Capability flags granted to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePermissions {
    pub can_submit_project: bool,
    pub can_view_own_projects: bool,
    pub can_approve_projects: bool,
    pub can_manage_users: bool,
    pub can_create_events: bool,
}

impl RolePermissions {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::SubmitProject => self.can_submit_project,
            Capability::ViewOwnProjects => self.can_view_own_projects,
            Capability::ApproveProjects => self.can_approve_projects,
            Capability::ManageUsers => self.can_manage_users,
            Capability::CreateEvents => self.can_create_events,
        }
    }
}

const GUEST: RolePermissions = RolePermissions {
    can_submit_project: false,
    can_view_own_projects: false,
    can_approve_projects: false,
    can_manage_users: false,
    can_create_events: false,
};

const STUDENT: RolePermissions = RolePermissions {
    can_submit_project: true,
    can_view_own_projects: true,
    can_approve_projects: false,
    can_manage_users: false,
    can_create_events: false,
};

// Faculty approval is the review phase; admin approval is final.
const FACULTY: RolePermissions = RolePermissions {
    can_submit_project: true,
    can_view_own_projects: true,
    can_approve_projects: true,
    can_manage_users: false,
    can_create_events: true,
};

const ADMIN: RolePermissions = RolePermissions {
    can_submit_project: true,
    can_view_own_projects: true,
    can_approve_projects: true,
    can_manage_users: true,
    can_create_events: true,
};

/// Returns the static capability row for `role`.
pub fn permissions_for(role: Role) -> &'static RolePermissions {
    match role {
        Role::Guest => &GUEST,
        Role::Student => &STUDENT,
        Role::Faculty => &FACULTY,
        Role::Admin => &ADMIN,
    }
}

/// Answers "can `role` do `capability`?".
pub fn check(role: Role, capability: Capability) -> bool {
    permissions_for(role).allows(capability)
}

/// String-keyed lookup for callers holding raw labels.
///
/// Unknown role or capability keys yield `false`, never an error.
pub fn check_key(role: &str, capability: &str) -> bool {
    match (Role::parse(role), Capability::parse(capability)) {
        (Some(role), Some(capability)) => check(role, capability),
        _ => false,
    }
}

/// Guard used by UI collaborators before attempting a mutation.
pub fn require(role: Role, capability: Capability) -> Result<(), PermissionDenied> {
    if check(role, capability) {
        Ok(())
    } else {
        Err(PermissionDenied { role, capability })
    }
}

/// Capability check failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDenied {
    pub role: Role,
    pub capability: Capability,
}

impl Display for PermissionDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "permission denied: role {} lacks {}",
            self.role,
            self.capability.as_str()
        )
    }
}

impl Error for PermissionDenied {}
