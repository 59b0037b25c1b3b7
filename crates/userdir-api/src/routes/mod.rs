//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 로그인/가입/토큰 재발급/본인 계정 관리
//! - `/api/v1/users` - 사용자 관리 (역할 게이트)

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{auth_router, LoginRequest, MessageResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use users::{users_router, UsersListResponse};

use axum::Router;
use std::sync::Arc;

use crate::middleware::{rate_limit_middleware, RateLimitState};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
/// rate limiter가 주어지면 자격증명 엔드포인트(`/api/v1/auth`)에만
/// 적용됩니다 (비밀번호 무차별 대입 억제).
pub fn create_api_router(rate_limit: Option<RateLimitState>) -> Router<Arc<AppState>> {
    let auth = match rate_limit {
        Some(limiter) => auth_router().layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        )),
        None => auth_router(),
    };

    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/auth", auth)
        .nest("/api/v1/users", users_router())
}
