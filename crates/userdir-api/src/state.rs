//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//!
//! 요청 간 공유되는 가변 상태는 없습니다. 공유되는 것은 연결 풀과
//! 불변 키 자료뿐입니다.

use std::sync::Arc;

use crate::auth::JwtCodec;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: sqlx::PgPool,

    /// JWT 코덱. 서명/검증 키는 기동 시 한 번 로드되어 불변으로
    /// 유지되며 동기화 없이 동시 읽기가 안전합니다.
    pub codec: Arc<JwtCodec>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(db_pool: sqlx::PgPool, codec: JwtCodec) -> Self {
        Self {
            db_pool,
            codec: Arc::new(codec),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// DB 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.db_pool).await.is_ok()
    }
}
