//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공합니다. 도메인 에러는
//! 스펙의 표대로 상태 코드에 매핑되고, 인프라 에러는 원인을 로그에만
//! 남기고 일반화된 500으로 응답합니다. 로그만 남기고 성공으로 삼키는
//! 일은 없습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use userdir_core::AuthError;

/// 통합 API 에러 응답 본문.
///
/// # 예시
///
/// ```json
/// {
///   "code": "USER_NOT_FOUND",
///   "message": "사용자를 찾을 수 없습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_TOKEN", "USER_ALREADY_EXISTS")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 도메인 에러의 HTTP 래퍼.
///
/// `AuthError`는 코어 크레이트 소유이므로 응답 변환은 이 newtype이
/// 담당합니다. 핸들러와 추출기는 전부 이 타입으로 거부합니다.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(err)
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        let (status, code) = match &err {
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AuthError::WrongPassword => (StatusCode::UNAUTHORIZED, "WRONG_PASSWORD"),
            AuthError::UserBlocked => (StatusCode::FORBIDDEN, "USER_BLOCKED"),
            AuthError::PasswordNotValid => (StatusCode::UNAUTHORIZED, "PASSWORD_NOT_VALID"),
            AuthError::UserAlreadyExists => (StatusCode::CONFLICT, "USER_ALREADY_EXISTS"),
            AuthError::PermissionDenied => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            AuthError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = if err.is_client_error() {
            err.to_string()
        } else {
            // 인프라 에러의 원인은 응답 대신 로그로
            tracing::error!(error = %err, "요청 처리 중 내부 에러");
            "내부 오류가 발생했습니다".to_string()
        };

        (status, Json(ApiErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::WrongPassword, StatusCode::UNAUTHORIZED),
            (AuthError::UserBlocked, StatusCode::FORBIDDEN),
            (AuthError::PasswordNotValid, StatusCode::UNAUTHORIZED),
            (AuthError::UserAlreadyExists, StatusCode::CONFLICT),
            (AuthError::PermissionDenied, StatusCode::FORBIDDEN),
            (
                AuthError::Validation("email".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AuthError::Database("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::Internal("bug".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = ApiError(AuthError::Database("password=hunter2 leaked".into()))
            .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ApiErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.code, "INTERNAL_ERROR");
        assert!(!parsed.message.contains("hunter2"));
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ApiErrorResponse::new("USER_NOT_FOUND", "사용자를 찾을 수 없습니다");
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains(r#""code":"USER_NOT_FOUND""#));
        assert!(json.contains("timestamp"));
        assert!(!json.contains("details"));
    }
}
