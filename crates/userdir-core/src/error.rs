//! 사용자 디렉토리 서비스의 에러 타입.
//!
//! 이 모듈은 인증/인가 흐름 전반에서 사용되는 도메인 에러를 정의합니다.
//! 도메인 에러는 감지 지점에서 발생시켜 경계까지 그대로 전파합니다.
//! 재시도하지 않습니다 (모두 호출자의 입력 또는 상태가 원인).

use thiserror::Error;

/// 인증/인가 도메인 에러.
#[derive(Debug, Error)]
pub enum AuthError {
    /// 유효하지 않은 토큰 (서명 불일치, 만료, 잘못된 타입, subject 누락)
    #[error("유효하지 않은 토큰")]
    InvalidToken,

    /// 사용자를 찾을 수 없음
    #[error("사용자를 찾을 수 없습니다")]
    UserNotFound,

    /// 비밀번호 불일치
    #[error("비밀번호가 일치하지 않습니다")]
    WrongPassword,

    /// 차단된 사용자
    #[error("차단된 사용자입니다")]
    UserBlocked,

    /// 비밀번호 복잡도 미달
    #[error("비밀번호가 정책에 맞지 않습니다")]
    PasswordNotValid,

    /// username 또는 email 중복
    #[error("이미 존재하는 사용자입니다")]
    UserAlreadyExists,

    /// 권한 부족
    #[error("권한이 없습니다")]
    PermissionDenied,

    /// 요청 본문 검증 실패
    #[error("요청 검증 실패: {0}")]
    Validation(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 인증 작업을 위한 Result 타입.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// 호출자 잘못으로 인한 에러인지 확인합니다.
    ///
    /// 클라이언트 에러는 4xx로 매핑되고 본문에 에러 종류가 드러납니다.
    /// 나머지는 원인을 로그에만 남기고 일반화된 500으로 응답합니다.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Database(_) | AuthError::Internal(_))
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(AuthError::InvalidToken.is_client_error());
        assert!(AuthError::UserNotFound.is_client_error());
        assert!(AuthError::WrongPassword.is_client_error());
        assert!(AuthError::UserBlocked.is_client_error());
        assert!(AuthError::PasswordNotValid.is_client_error());
        assert!(AuthError::UserAlreadyExists.is_client_error());
        assert!(AuthError::PermissionDenied.is_client_error());
        assert!(AuthError::Validation("bad email".to_string()).is_client_error());
    }

    #[test]
    fn test_infrastructure_errors() {
        assert!(!AuthError::Database("connection refused".to_string()).is_client_error());
        assert!(!AuthError::Internal("unknown role".to_string()).is_client_error());
    }
}
