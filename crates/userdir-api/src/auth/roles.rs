//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 및 권한 정의. 역할 이름은 닫힌 집합이며 DB의 roles
//! 테이블에 시드되어 있습니다.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 디렉토리에서 사용자의 권한 수준을 정의합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// 관리자 - 모든 사용자 조회/수정/삭제 가능
    Admin,
    /// 중재자 - 다른 사용자 조회만 가능
    Moderator,
    /// 일반 사용자 - 본인 계정만 관리
    User,
}

impl Role {
    /// 역할이 특정 권한을 가지는지 확인.
    ///
    /// 중재자는 조회만 가능하고 수정/삭제는 불가능합니다. 이 비대칭은
    /// 관리 API 전체에서 그대로 유지되어야 합니다.
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true, // Admin은 모든 권한 보유
            Role::Moderator => matches!(permission, Permission::ViewUsers),
            Role::User => false,
        }
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "MODERATOR" => Some(Role::Moderator),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::Moderator => "MODERATOR",
            Role::User => "USER",
        };
        write!(f, "{}", s)
    }
}

/// 관리 API 권한.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// 다른 사용자 조회/목록 (ADMIN, MODERATOR)
    ViewUsers,
    /// 다른 사용자 수정/삭제 (ADMIN 전용)
    ManageUsers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        // Admin은 모든 권한 보유
        assert!(Role::Admin.has_permission(Permission::ViewUsers));
        assert!(Role::Admin.has_permission(Permission::ManageUsers));

        // Moderator는 조회만 (비대칭 유지)
        assert!(Role::Moderator.has_permission(Permission::ViewUsers));
        assert!(!Role::Moderator.has_permission(Permission::ManageUsers));

        // User는 관리 권한 없음
        assert!(!Role::User.has_permission(Permission::ViewUsers));
        assert!(!Role::User.has_permission(Permission::ManageUsers));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("moderator"), Some(Role::Moderator));
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("unknown"), None);
    }

    #[test]
    fn test_role_serialization() {
        let role = Role::Admin;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"ADMIN\"");

        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_role_display_round_trip() {
        for role in [Role::Admin, Role::Moderator, Role::User] {
            assert_eq!(Role::parse(&role.to_string()), Some(role));
        }
    }
}
