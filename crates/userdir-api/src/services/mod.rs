//! 비즈니스 서비스.
//!
//! 라우트 핸들러에서 호출되는 오케스트레이션 계층입니다. 저장소와
//! 토큰 코덱, 비밀번호 정책을 묶어 스펙상의 작업 단위를 구성합니다.

pub mod admin;
pub mod session;

pub use admin::AdminService;
pub use session::{CurrentUser, SessionService, UpdatedUser};
