//! User Repository
//!
//! users 테이블 관련 데이터베이스 연산을 담당합니다.
//!
//! 유일성 검사와 쓰기는 항상 하나의 트랜잭션 안에서 수행됩니다.
//! 사전 검사와 INSERT/UPDATE 사이의 경합은 read-committed에서 언제든
//! 가능하므로, 쓰기 시점의 unique 제약 위반(23505)도 잡아서
//! `UserAlreadyExists`로 변환합니다. 저장소 에러를 그대로 흘리지 않습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use userdir_core::{AuthError, AuthResult};

use super::roles::RoleRepository;
use crate::auth::Role;

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 레코드.
///
/// 비밀번호 다이제스트를 포함하므로 직렬화하지 않습니다. 외부로는
/// [`UserView`]로 변환해 내보냅니다.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(default)]
    pub image_path: Option<String>,
    pub role_id: i32,
    pub is_blocked: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 외부 노출용 사용자 뷰 (다이제스트 제외).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub image_path: Option<String>,
    pub role_id: i32,
    pub is_blocked: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            username: user.username,
            email: user.email,
            image_path: user.image_path,
            role_id: user.role_id,
            is_blocked: user.is_blocked,
            is_active: user.is_active,
            created_at: user.created_at,
            modified_at: user.modified_at,
        }
    }
}

/// 가입 요청 입력.
///
/// 비밀번호는 복잡도 정책([`crate::auth::check_complexity`])으로 따로
/// 검사하므로 여기서는 형식 검증만 합니다.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub surname: String,
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(max = 128))]
    #[serde(default)]
    pub image_path: Option<String>,
}

/// 본인 정보 부분 수정 입력.
///
/// 값이 없는 필드는 건드리지 않습니다 (부분 수정 의미론. 누락 필드를
/// null로 덮지 않음).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub surname: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    #[validate(length(max = 128))]
    pub image_path: Option<String>,
}

/// 관리자용 부분 수정 입력. 역할과 차단 상태까지 바꿀 수 있습니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdminUserUpdate {
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub surname: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    #[validate(length(max = 128))]
    pub image_path: Option<String>,
    #[validate(range(min = 0))]
    pub role_id: Option<i32>,
    pub is_blocked: Option<bool>,
}

/// 부분 수정의 내부 표현. 비밀번호는 이미 다이제스트로 바뀐 상태입니다.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub image_path: Option<String>,
    pub role_id: Option<i32>,
    pub is_blocked: Option<bool>,
}

impl UserUpdate {
    /// username 변경 여부 (변경 시 자격증명 재발급 필요).
    pub fn changes_username(&self, current: &UserRecord) -> bool {
        matches!(&self.username, Some(new) if new != &current.username)
    }

    pub fn into_changes(self, password_hash: Option<String>) -> UserChanges {
        UserChanges {
            name: self.name,
            surname: self.surname,
            username: self.username,
            email: self.email,
            password_hash,
            image_path: self.image_path,
            role_id: None,
            is_blocked: None,
        }
    }
}

impl AdminUserUpdate {
    pub fn into_changes(self, password_hash: Option<String>) -> UserChanges {
        UserChanges {
            name: self.name,
            surname: self.surname,
            username: self.username,
            email: self.email,
            password_hash,
            image_path: self.image_path,
            role_id: self.role_id,
            is_blocked: self.is_blocked,
        }
    }
}

// ================================================================================================
// Pagination
// ================================================================================================

/// 정렬 가능한 컬럼 (닫힌 집합).
///
/// SQL에는 [`SortField::column`]이 반환하는 상수 문자열만 들어갑니다.
/// 사용자 입력이 그대로 보간되는 일은 없습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Name,
    Surname,
    #[default]
    Username,
    Email,
    ModifiedAt,
    CreatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Surname => "surname",
            SortField::Username => "username",
            SortField::Email => "email",
            SortField::ModifiedAt => "modified_at",
            SortField::CreatedAt => "created_at",
        }
    }
}

/// 정렬 방향.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// 목록 조회 파라미터.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct Pagination {
    /// 페이지 번호 (1부터)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    /// 페이지 크기
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u32,
    /// name 일치 필터
    #[serde(default)]
    pub filter_by_name: Option<String>,
    /// 정렬 컬럼
    #[serde(default)]
    pub sort_by: SortField,
    /// 정렬 방향
    #[serde(default)]
    pub order_by: SortOrder,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    30
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            filter_by_name: None,
            sort_by: SortField::default(),
            order_by: SortOrder::default(),
        }
    }
}

impl Pagination {
    fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

// ================================================================================================
// Repository
// ================================================================================================

/// unique 제약 위반(Postgres 23505) 여부 확인.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// 목록 조회 SQL 생성. 컬럼/방향은 닫힌 집합에서만 선택됩니다.
fn build_list_query(pagination: &Pagination) -> String {
    format!(
        "SELECT * FROM users WHERE ($1::text IS NULL OR name = $1) ORDER BY {} {} LIMIT $2 OFFSET $3",
        pagination.sort_by.column(),
        pagination.order_by.keyword()
    )
}

/// User Repository
pub struct UserRepository;

impl UserRepository {
    /// id로 조회.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AuthResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// username으로 조회 (토큰 subject 해석용).
    pub async fn find_by_username(pool: &PgPool, username: &str) -> AuthResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// username 또는 email로 조회 (로그인 식별자는 둘 다 허용).
    pub async fn find_by_username_or_email(
        pool: &PgPool,
        identifier: &str,
    ) -> AuthResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE username = $1 OR email = $1",
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// 사용자 생성.
    ///
    /// 유일성 사전 검사, 기본 역할(USER) 해석, INSERT가 한 트랜잭션에서
    /// 수행됩니다. 경합으로 사전 검사를 통과한 중복도 23505로 잡아
    /// `UserAlreadyExists`로 변환합니다.
    pub async fn create(
        pool: &PgPool,
        input: &NewUser,
        password_hash: &str,
    ) -> AuthResult<UserRecord> {
        let mut tx = pool.begin().await?;

        let conflict: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
                .bind(&input.username)
                .bind(&input.email)
                .fetch_optional(&mut *tx)
                .await?;

        if conflict.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let role_id = RoleRepository::find_by_name(&mut *tx, &Role::User.to_string())
            .await?
            .ok_or_else(|| AuthError::Internal("기본 역할(USER)이 시드되지 않았습니다".into()))?
            .id;

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, surname, username, email, password_hash, image_path, role_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.surname)
        .bind(&input.username)
        .bind(&input.email)
        .bind(password_hash)
        .bind(&input.image_path)
        .bind(role_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserAlreadyExists
            } else {
                AuthError::from(e)
            }
        })?;

        tx.commit().await?;

        Ok(record)
    }

    /// 부분 수정.
    ///
    /// 값이 있는 필드만 덮어쓰고(COALESCE) 나머지는 보존합니다.
    /// username/email이 다른 레코드와 충돌하면 원본을 건드리지 않고
    /// `UserAlreadyExists`로 실패합니다.
    pub async fn update_partial(
        pool: &PgPool,
        user: &UserRecord,
        changes: UserChanges,
    ) -> AuthResult<UserRecord> {
        let mut tx = pool.begin().await?;

        if let Some(new_username) = &changes.username {
            if new_username != &user.username {
                let taken: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM users WHERE username = $1 AND id <> $2")
                        .bind(new_username)
                        .bind(user.id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if taken.is_some() {
                    return Err(AuthError::UserAlreadyExists);
                }
            }
        }

        if let Some(new_email) = &changes.email {
            if new_email != &user.email {
                let taken: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM users WHERE email = $1 AND id <> $2")
                        .bind(new_email)
                        .bind(user.id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if taken.is_some() {
                    return Err(AuthError::UserAlreadyExists);
                }
            }
        }

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name          = COALESCE($2, name),
                surname       = COALESCE($3, surname),
                username      = COALESCE($4, username),
                email         = COALESCE($5, email),
                password_hash = COALESCE($6, password_hash),
                image_path    = COALESCE($7, image_path),
                role_id       = COALESCE($8, role_id),
                is_blocked    = COALESCE($9, is_blocked),
                modified_at   = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&changes.name)
        .bind(&changes.surname)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.image_path)
        .bind(changes.role_id)
        .bind(changes.is_blocked)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserAlreadyExists
            } else {
                AuthError::from(e)
            }
        })?;

        tx.commit().await?;

        Ok(record)
    }

    /// 삭제.
    pub async fn delete(pool: &PgPool, id: Uuid) -> AuthResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    /// 목록 조회 (페이지네이션 + name 필터 + 정렬).
    pub async fn list(pool: &PgPool, pagination: &Pagination) -> AuthResult<Vec<UserRecord>> {
        let query = build_list_query(pagination);

        let records = sqlx::query_as::<_, UserRecord>(&query)
            .bind(&pagination.filter_by_name)
            .bind(i64::from(pagination.limit))
            .bind(pagination.offset())
            .fetch_all(pool)
            .await?;

        Ok(records)
    }
}

// ================================================================================================
// 테스트 헬퍼
// ================================================================================================

/// 메모리상의 사용자 레코드 생성 (DB 없이 순수 로직 테스트용).
#[cfg(test)]
pub(crate) fn test_user(username: &str, email: &str, password_hash: &str) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        id: Uuid::new_v4(),
        name: "Test".to_string(),
        surname: "User".to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        image_path: None,
        role_id: 3,
        is_blocked: false,
        is_active: true,
        created_at: now,
        modified_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_columns_are_whitelisted() {
        let fields = [
            (SortField::Id, "id"),
            (SortField::Name, "name"),
            (SortField::Surname, "surname"),
            (SortField::Username, "username"),
            (SortField::Email, "email"),
            (SortField::ModifiedAt, "modified_at"),
            (SortField::CreatedAt, "created_at"),
        ];

        for (field, column) in fields {
            assert_eq!(field.column(), column);
        }
    }

    #[test]
    fn test_build_list_query_defaults() {
        let query = build_list_query(&Pagination::default());

        assert!(query.contains("ORDER BY username DESC"));
        assert!(query.contains("LIMIT $2 OFFSET $3"));
        assert!(query.contains("($1::text IS NULL OR name = $1)"));
    }

    #[test]
    fn test_build_list_query_custom_sort() {
        let pagination = Pagination {
            sort_by: SortField::CreatedAt,
            order_by: SortOrder::Asc,
            ..Default::default()
        };

        let query = build_list_query(&pagination);
        assert!(query.contains("ORDER BY created_at ASC"));
    }

    #[test]
    fn test_pagination_offset() {
        let pagination = Pagination {
            page: 3,
            limit: 30,
            ..Default::default()
        };
        assert_eq!(pagination.offset(), 60);

        let first_page = Pagination::default();
        assert_eq!(first_page.offset(), 0);
    }

    #[test]
    fn test_pagination_defaults_from_query_string() {
        let pagination: Pagination = serde_json::from_str("{}").unwrap();

        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 30);
        assert!(pagination.filter_by_name.is_none());
        assert_eq!(pagination.sort_by, SortField::Username);
        assert_eq!(pagination.order_by, SortOrder::Desc);
    }

    #[test]
    fn test_pagination_validation() {
        let bad = Pagination {
            page: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let good = Pagination::default();
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_sort_order_wire_values() {
        let asc: SortOrder = serde_json::from_str(r#""ASC""#).unwrap();
        let desc: SortOrder = serde_json::from_str(r#""DESC""#).unwrap();
        assert_eq!(asc, SortOrder::Asc);
        assert_eq!(desc, SortOrder::Desc);
        assert!(serde_json::from_str::<SortOrder>(r#""asc""#).is_err());
    }

    #[test]
    fn test_changes_username() {
        let user = test_user("alice", "alice@example.com", "hash");

        let same = UserUpdate {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        assert!(!same.changes_username(&user));

        let renamed = UserUpdate {
            username: Some("alice2".to_string()),
            ..Default::default()
        };
        assert!(renamed.changes_username(&user));

        let untouched = UserUpdate {
            surname: Some("Doe".to_string()),
            ..Default::default()
        };
        assert!(!untouched.changes_username(&user));
    }

    #[test]
    fn test_user_view_hides_digest() {
        let user = test_user("alice", "alice@example.com", "secret-digest");
        let view = UserView::from(user);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret-digest"));
        assert!(!json.contains("password"));
        assert!(json.contains(r#""username":"alice""#));
    }

    #[test]
    fn test_new_user_validation() {
        let valid = NewUser {
            name: "Alice".to_string(),
            surname: "Kim".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "Password1".to_string(),
            image_path: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = NewUser {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let bad_username = NewUser {
            username: "ab".to_string(),
            ..valid
        };
        assert!(bad_username.validate().is_err());
    }
}
