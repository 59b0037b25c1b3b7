//! Role Repository
//!
//! roles 테이블 조회를 담당합니다. 역할은 마이그레이션으로 시드되는
//! 읽기 전용 데이터입니다.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use userdir_core::AuthResult;

/// 역할 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleRecord {
    pub id: i32,
    pub name: String,
}

/// Role Repository
pub struct RoleRepository;

impl RoleRepository {
    /// id로 역할 조회.
    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> AuthResult<Option<RoleRecord>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    /// 이름으로 역할 조회.
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> AuthResult<Option<RoleRecord>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }
}
