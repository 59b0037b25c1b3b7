//! 사용자 디렉토리 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - username/password 인증과 JWT 발급/검증 (RS256)
//! - 역할 기반 사용자 관리 API
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 코덱, 비밀번호 정책, 역할, 추출기, 해석기
//! - [`services`]: 세션/관리자 오케스트레이션
//! - [`repository`]: 데이터베이스 접근
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어 (메트릭, rate limit)
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    check_complexity, hash_password, verify_password, AccessAuth, Claims, JwtCodec, Permission,
    RefreshAuth, Role, TokenPair, TokenType,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::*;
pub use services::{AdminService, CurrentUser, SessionService, UpdatedUser};
pub use state::AppState;
