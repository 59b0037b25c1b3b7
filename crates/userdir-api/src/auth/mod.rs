//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`JwtCodec`]: RS256 토큰 발급/검증 (키는 기동 시 1회 로드)
//! - [`Claims`]: JWT 페이로드 구조체 (access/refresh 타입 판별자 포함)
//! - [`Role`] / [`Permission`]: 역할과 관리 권한
//! - [`AccessAuth`] / [`RefreshAuth`]: Axum 추출기
//! - [`resolver`]: 페이로드 → 사용자 레코드/역할 해석 및 역할 게이트
//! - 비밀번호 해싱/복잡도 정책

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod resolver;
pub mod roles;

pub use jwt::{Claims, JwtCodec, TokenPair, TokenType};
pub use middleware::{AccessAuth, RefreshAuth};
pub use password::{
    check_complexity, hash_password, hash_password_blocking, verify_password,
    verify_password_blocking, PasswordError,
};
pub use resolver::{require_permission, resolve_principal, resolve_role};
pub use roles::{Permission, Role};
