//! 관리자 서비스.
//!
//! 다른 사용자 레코드에 대한 관리 작업입니다. 모든 작업은 대상 레코드에
//! 손대기 전에 호출자를 토큰에서 다시 해석하고 역할 게이트를 통과해야
//! 합니다.
//!
//! 정책: 조회/목록은 {ADMIN, MODERATOR}, 수정/삭제는 {ADMIN}만.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use userdir_core::{AuthError, AuthResult};

use crate::auth::{
    check_complexity, hash_password_blocking, require_permission, resolve_principal, Claims,
    Permission,
};
use crate::repository::{AdminUserUpdate, Pagination, UserRepository, UserView};

/// 관리자 서비스.
pub struct AdminService;

impl AdminService {
    /// 전체 사용자 목록 (페이지네이션/필터/정렬).
    pub async fn list_users(
        pool: &PgPool,
        claims: &Claims,
        pagination: &Pagination,
    ) -> AuthResult<Vec<UserView>> {
        let caller = resolve_principal(pool, claims).await?;
        require_permission(pool, &caller, Permission::ViewUsers).await?;

        let users = UserRepository::list(pool, pagination).await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// id로 사용자 조회.
    pub async fn get_user(pool: &PgPool, claims: &Claims, user_id: Uuid) -> AuthResult<UserView> {
        let caller = resolve_principal(pool, claims).await?;
        require_permission(pool, &caller, Permission::ViewUsers).await?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserView::from(user))
    }

    /// 임의 사용자 부분 수정. 역할/차단 상태 변경 포함.
    pub async fn update_user(
        pool: &PgPool,
        claims: &Claims,
        user_id: Uuid,
        update: AdminUserUpdate,
    ) -> AuthResult<UserView> {
        let caller = resolve_principal(pool, claims).await?;
        require_permission(pool, &caller, Permission::ManageUsers).await?;

        let target = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = match &update.password {
            Some(password) => {
                if !check_complexity(password) {
                    return Err(AuthError::PasswordNotValid);
                }
                Some(hash_password_blocking(password.clone()).await?)
            }
            None => None,
        };

        let updated =
            UserRepository::update_partial(pool, &target, update.into_changes(password_hash))
                .await?;

        info!(
            admin = %caller.username,
            target = %updated.username,
            "관리자 사용자 수정"
        );
        Ok(UserView::from(updated))
    }

    /// 임의 사용자 삭제.
    pub async fn delete_user(pool: &PgPool, claims: &Claims, user_id: Uuid) -> AuthResult<()> {
        let caller = resolve_principal(pool, claims).await?;
        require_permission(pool, &caller, Permission::ManageUsers).await?;

        let target = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        UserRepository::delete(pool, target.id).await?;

        info!(
            admin = %caller.username,
            target = %target.username,
            "관리자 사용자 삭제"
        );
        Ok(())
    }
}
