//! 토큰 페이로드 → 사용자 레코드 해석.
//!
//! 검증된 페이로드의 subject로 저장소의 사용자 레코드와 역할을 찾습니다.
//! 요청마다 다시 조회하며 캐싱하지 않습니다. 차단/역할 상태는 항상
//! 저장소의 현재 값을 기준으로 판정되어야 합니다.

use sqlx::PgPool;

use userdir_core::{AuthError, AuthResult};

use super::jwt::Claims;
use super::roles::{Permission, Role};
use crate::repository::{RoleRepository, UserRecord, UserRepository};

/// 페이로드의 subject로 사용자 레코드 조회.
///
/// subject가 비어 있으면 `InvalidToken`, 조회 실패면 `UserNotFound`.
pub async fn resolve_principal(pool: &PgPool, claims: &Claims) -> AuthResult<UserRecord> {
    if claims.sub.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    UserRepository::find_by_username(pool, &claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)
}

/// 사용자가 참조하는 역할 조회.
///
/// 역할 행이 없거나 이름이 닫힌 집합 밖이면 시드 데이터가 깨진 것이므로
/// 내부 에러로 표출합니다 (조용히 삼키지 않음).
pub async fn resolve_role(pool: &PgPool, user: &UserRecord) -> AuthResult<Role> {
    let record = RoleRepository::find_by_id(pool, user.role_id)
        .await?
        .ok_or_else(|| {
            AuthError::Internal(format!("역할 행이 없습니다: role_id={}", user.role_id))
        })?;

    Role::parse(&record.name)
        .ok_or_else(|| AuthError::Internal(format!("알 수 없는 역할 이름: {}", record.name)))
}

/// 역할 게이트.
///
/// 사용자의 역할을 해석한 뒤 요구 권한이 없으면 `PermissionDenied`.
/// 모든 관리 API는 대상 레코드에 손대기 전에 이 검사를 통과해야 합니다.
pub async fn require_permission(
    pool: &PgPool,
    user: &UserRecord,
    permission: Permission,
) -> AuthResult<Role> {
    let role = resolve_role(pool, user).await?;

    if role.has_permission(permission) {
        Ok(role)
    } else {
        tracing::debug!(
            username = %user.username,
            role = %role,
            permission = ?permission,
            "권한 부족"
        );
        Err(AuthError::PermissionDenied)
    }
}
