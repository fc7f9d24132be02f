use coe_portal_core::auth::permissions::{require, PermissionDenied};
use coe_portal_core::{check, check_key, permissions_for, Capability, Role};

#[test]
fn full_table_matches_role_matrix() {
    let expected = [
        (Role::Guest, [false, false, false, false, false]),
        (Role::Student, [true, true, false, false, false]),
        (Role::Faculty, [true, true, true, false, true]),
        (Role::Admin, [true, true, true, true, true]),
    ];
    let capabilities = [
        Capability::SubmitProject,
        Capability::ViewOwnProjects,
        Capability::ApproveProjects,
        Capability::ManageUsers,
        Capability::CreateEvents,
    ];

    for (role, row) in expected {
        for (capability, allowed) in capabilities.iter().zip(row) {
            assert_eq!(
                check(role, *capability),
                allowed,
                "role {role} capability {}",
                capability.as_str()
            );
        }
    }
}

#[test]
fn string_keys_resolve_like_typed_lookup() {
    assert!(check_key("STUDENT", "canSubmitProject"));
    assert!(!check_key("STUDENT", "canApproveProjects"));
    assert!(check_key("FACULTY", "canCreateEvents"));
    assert!(check_key("ADMIN", "canManageUsers"));
}

#[test]
fn unknown_keys_fail_closed() {
    assert!(!check_key("SUPERUSER", "canSubmitProject"));
    assert!(!check_key("ADMIN", "canDeleteEverything"));
    assert!(!check_key("", ""));
}

#[test]
fn admin_row_is_a_superset_of_every_role() {
    let admin = permissions_for(Role::Admin);
    for role in Role::ALL {
        let row = permissions_for(role);
        for capability in Capability::ALL {
            if row.allows(capability) {
                assert!(admin.allows(capability));
            }
        }
    }
}

#[test]
fn require_reports_role_and_capability() {
    assert!(require(Role::Faculty, Capability::ApproveProjects).is_ok());
    assert_eq!(
        require(Role::Guest, Capability::SubmitProject),
        Err(PermissionDenied {
            role: Role::Guest,
            capability: Capability::SubmitProject,
        })
    );
}
