//! 세션 서비스.
//!
//! 로그인, 가입, 토큰 재발급, 본인 계정 관리를 오케스트레이션합니다.
//!
//! 세션 상태는 전부 토큰 안에 있습니다 (stateless). 서버에는 세션
//! 객체가 없고, 어느 작업이 허용되는지는 제시된 토큰의 타입과 검증
//! 결과로만 결정됩니다.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use utoipa::ToSchema;

use userdir_core::{AuthError, AuthResult};

use crate::auth::{
    check_complexity, hash_password_blocking, resolve_principal, verify_password_blocking, Claims,
    JwtCodec, TokenPair,
};
use crate::repository::{NewUser, UserRecord, UserRepository, UserUpdate};

/// 현재 사용자 뷰. 토큰의 발급 시각(iat)을 함께 노출합니다.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub image_path: Option<String>,
    /// 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
}

/// 본인 정보 수정 결과.
///
/// username이 바뀌면 기존 Access Token의 subject가 더 이상 맞지 않으므로
/// 새 자격증명 페어를 함께 돌려줍니다.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatedUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenPair>,
}

impl UpdatedUser {
    fn from_record(user: &UserRecord, token: Option<TokenPair>) -> Self {
        Self {
            name: user.name.clone(),
            surname: user.surname.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            image_path: user.image_path.clone(),
            token,
        }
    }
}

/// 로그인 검사 결과 판정.
///
/// 차단 여부는 비밀번호 검사를 통과한 뒤에만 판정합니다. 차단 상태가
/// 비밀번호 정답 여부보다 먼저 드러나면 안 됩니다.
fn authorize_login(user: &UserRecord, password_ok: bool) -> AuthResult<()> {
    if !password_ok {
        return Err(AuthError::WrongPassword);
    }
    if user.is_blocked {
        return Err(AuthError::UserBlocked);
    }
    Ok(())
}

/// 세션 서비스.
pub struct SessionService;

impl SessionService {
    /// 로그인.
    ///
    /// 식별자는 username 또는 email 어느 쪽이든 허용합니다.
    pub async fn login(
        pool: &PgPool,
        codec: &JwtCodec,
        identifier: &str,
        password: &str,
    ) -> AuthResult<TokenPair> {
        let user = UserRepository::find_by_username_or_email(pool, identifier)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_ok =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        authorize_login(&user, password_ok)?;

        info!(username = %user.username, "로그인 성공");
        codec.issue_pair(&user.username, &user.email)
    }

    /// 가입.
    ///
    /// 유일성 검사를 포함한 레코드 생성은 저장소가 한 트랜잭션으로
    /// 수행하고, 성공하면 로그인과 동일한 형태의 자격증명을 발급합니다.
    pub async fn signup(pool: &PgPool, codec: &JwtCodec, input: NewUser) -> AuthResult<TokenPair> {
        if !check_complexity(&input.password) {
            return Err(AuthError::PasswordNotValid);
        }

        let password_hash = hash_password_blocking(input.password.clone()).await?;
        let user = UserRepository::create(pool, &input, &password_hash).await?;

        info!(username = %user.username, "신규 사용자 가입");
        codec.issue_pair(&user.username, &user.email)
    }

    /// Access Token 재발급.
    ///
    /// 사용자를 다시 조회하므로 그 사이 삭제되었으면 `UserNotFound`,
    /// 차단되었으면 `UserBlocked`로 실패합니다. Refresh Token은
    /// 회전하지 않습니다. 기존 토큰이 원래 만료까지 유효합니다.
    pub async fn refresh(pool: &PgPool, codec: &JwtCodec, claims: &Claims) -> AuthResult<TokenPair> {
        let user = resolve_principal(pool, claims).await?;

        if user.is_blocked {
            return Err(AuthError::UserBlocked);
        }

        Ok(TokenPair {
            access_token: codec.issue_access(&user.username, &user.email)?,
            refresh_token: None,
            token_type: "Bearer".to_string(),
        })
    }

    /// 현재 사용자 조회. 저장소를 변경하지 않는 순수 프로젝션입니다.
    pub fn current_user(claims: &Claims, user: &UserRecord) -> CurrentUser {
        CurrentUser {
            name: user.name.clone(),
            surname: user.surname.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            image_path: user.image_path.clone(),
            iat: claims.iat,
        }
    }

    /// 본인 정보 부분 수정.
    pub async fn update_self(
        pool: &PgPool,
        codec: &JwtCodec,
        claims: &Claims,
        update: UserUpdate,
    ) -> AuthResult<UpdatedUser> {
        let user = resolve_principal(pool, claims).await?;
        let reissue = update.changes_username(&user);

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
            UserRepository::update_partial(pool, &user, update.into_changes(password_hash)).await?;

        // subject가 바뀌었으면 기존 토큰으로는 더 이상 본인을 가리킬 수
        // 없으므로 새 페어를 발급
        let token = if reissue {
            info!(
                old = %user.username,
                new = %updated.username,
                "username 변경으로 자격증명 재발급"
            );
            Some(codec.issue_pair(&updated.username, &updated.email)?)
        } else {
            None
        };

        Ok(UpdatedUser::from_record(&updated, token))
    }

    /// 본인 계정 삭제.
    pub async fn delete_self(pool: &PgPool, claims: &Claims) -> AuthResult<()> {
        let user = resolve_principal(pool, claims).await?;
        UserRepository::delete(pool, user.id).await?;

        info!(username = %user.username, "사용자 본인 삭제");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, verify_password, TokenType};
    use crate::repository::users::test_user;

    #[test]
    fn test_authorize_login_wrong_password() {
        let user = test_user("alice", "alice@example.com", "hash");
        assert!(matches!(
            authorize_login(&user, false),
            Err(AuthError::WrongPassword)
        ));
    }

    #[test]
    fn test_authorize_login_blocked_checked_after_password() {
        let mut user = test_user("alice", "alice@example.com", "hash");
        user.is_blocked = true;

        // 차단 사용자라도 비밀번호가 틀리면 WrongPassword가 먼저
        assert!(matches!(
            authorize_login(&user, false),
            Err(AuthError::WrongPassword)
        ));

        // 비밀번호가 맞아야 차단이 드러남
        assert!(matches!(
            authorize_login(&user, true),
            Err(AuthError::UserBlocked)
        ));
    }

    #[test]
    fn test_authorize_login_ok() {
        let user = test_user("alice", "alice@example.com", "hash");
        assert!(authorize_login(&user, true).is_ok());
    }

    #[test]
    fn test_credential_check_against_real_digest() {
        let hash = hash_password("Password1").unwrap();
        let user = test_user("alice", "alice@example.com", &hash);

        assert!(authorize_login(&user, verify_password("Password1", &user.password_hash)).is_ok());
        assert!(matches!(
            authorize_login(&user, verify_password("Password2", &user.password_hash)),
            Err(AuthError::WrongPassword)
        ));
    }

    #[test]
    fn test_current_user_projects_iat() {
        let user = test_user("alice", "alice@example.com", "hash");
        let claims = Claims::access("alice", "alice@example.com", 5);

        let view = SessionService::current_user(&claims, &user);
        assert_eq!(view.username, "alice");
        assert_eq!(view.iat, claims.iat);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_updated_user_omits_token_when_absent() {
        let user = test_user("alice", "alice@example.com", "hash");
        let view = UpdatedUser::from_record(&user, None);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("token"));
    }
}
