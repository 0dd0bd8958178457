//! Role-based authorization guards.
//!
//! Each endpoint declares its minimum required role through one of the guard
//! extractors below; the actual access matrix lives in [`Permission::allows`]
//! so it can be tested in one place.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::features::auth::model::{AuthenticatedUser, Role};

/// Minimum role an endpoint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    AdminOnly,
    EditorOrAdmin,
    AnyRole,
}

impl Permission {
    pub fn allows(&self, role: Option<Role>) -> bool {
        match self {
            Permission::AdminOnly => role == Some(Role::Admin),
            Permission::EditorOrAdmin => {
                matches!(role, Some(Role::Admin) | Some(Role::Editor))
            }
            Permission::AnyRole => role.is_some(),
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            Permission::AdminOnly => "Admin role required.",
            Permission::EditorOrAdmin => "Editor or Admin role required.",
            Permission::AnyRole => "Authentication with an assigned role is required.",
        }
    }
}

fn check(parts: &mut Parts, permission: Permission) -> Result<AuthenticatedUser, AppError> {
    let user = parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !permission.allows(user.role) {
        return Err(AppError::Forbidden(permission.denial_message().to_string()));
    }

    Ok(user.clone())
}

/// Guard requiring the admin role.
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        check(parts, Permission::AdminOnly).map(RequireAdmin)
    }
}

/// Guard requiring the editor or admin role.
pub struct RequireEditor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        check(parts, Permission::EditorOrAdmin).map(RequireEditor)
    }
}

/// Guard requiring any of the three roles.
pub struct RequireAnyRole(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAnyRole
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        check(parts, Permission::AnyRole).map(RequireAnyRole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The full endpoint-to-permission access matrix, exercised as data.
    #[test]
    fn access_matrix() {
        let cases: &[(Permission, Option<Role>, bool)] = &[
            (Permission::AdminOnly, Some(Role::Admin), true),
            (Permission::AdminOnly, Some(Role::Editor), false),
            (Permission::AdminOnly, Some(Role::Viewer), false),
            (Permission::AdminOnly, None, false),
            (Permission::EditorOrAdmin, Some(Role::Admin), true),
            (Permission::EditorOrAdmin, Some(Role::Editor), true),
            (Permission::EditorOrAdmin, Some(Role::Viewer), false),
            (Permission::EditorOrAdmin, None, false),
            (Permission::AnyRole, Some(Role::Admin), true),
            (Permission::AnyRole, Some(Role::Editor), true),
            (Permission::AnyRole, Some(Role::Viewer), true),
            (Permission::AnyRole, None, false),
        ];

        for (permission, role, expected) in cases {
            assert_eq!(
                permission.allows(*role),
                *expected,
                "{:?} with {:?}",
                permission,
                role
            );
        }
    }
}
