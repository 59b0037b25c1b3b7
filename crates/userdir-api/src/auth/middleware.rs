//! Axum용 JWT 인증 추출기.
//!
//! `Authorization: Bearer <token>` 헤더에서 토큰을 꺼내 검증하고,
//! 타입 판별자까지 확인한 페이로드를 핸들러에 전달합니다.
//!
//! 헤더 누락, 형식 오류, 검증 실패, 타입 불일치는 전부 동일한
//! `InvalidToken`(401)으로 거부합니다. 원인은 구분해서 노출하지 않습니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use userdir_core::AuthError;

use super::jwt::{Claims, TokenType};
use crate::error::ApiError;
use crate::state::AppState;

/// Access Token 인증 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(
///     AccessAuth(claims): AccessAuth,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AccessAuth(pub Claims);

/// Refresh Token 인증 추출기. 토큰 재발급 엔드포인트 전용.
#[derive(Debug, Clone)]
pub struct RefreshAuth(pub Claims);

/// Bearer 헤더에서 토큰을 꺼내 검증.
fn decode_bearer(parts: &Parts, state: &AppState, expected: TokenType) -> Result<Claims, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    let claims = state.codec.decode(token)?;
    claims.require_type(expected)?;

    Ok(claims)
}

impl FromRequestParts<Arc<AppState>> for AccessAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        decode_bearer(parts, state, TokenType::Access)
            .map(AccessAuth)
            .map_err(ApiError)
    }
}

impl FromRequestParts<Arc<AppState>> for RefreshAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        decode_bearer(parts, state, TokenType::Refresh)
            .map(RefreshAuth)
            .map_err(ApiError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_keys::test_codec;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    /// DB 연결 없이 추출기만 검증하기 위한 상태 (lazy pool은 접속하지 않음).
    fn test_state() -> Arc<AppState> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/userdir_test")
            .unwrap();
        Arc::new(AppState::new(pool, test_codec()))
    }

    async fn protected(AccessAuth(claims): AccessAuth) -> String {
        claims.sub
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/me", get(protected))
            .with_state(state)
    }

    async fn send(app: Router, auth_header: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = auth_header {
            builder = builder.header("authorization", value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let state = test_state();
        assert_eq!(send(app(state), None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_is_unauthorized() {
        let state = test_state();

        // Bearer 접두사 없음
        assert_eq!(
            send(app(state.clone()), Some("Token abc")).await,
            StatusCode::UNAUTHORIZED
        );
        // 토큰 본문이 쓰레기
        assert_eq!(
            send(app(state), Some("Bearer not.a.jwt")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_on_access_route() {
        let state = test_state();
        let refresh = state.codec.issue_refresh("alice").unwrap();

        // 서명이 유효해도 타입이 다르면 동일한 401
        assert_eq!(
            send(app(state), Some(&format!("Bearer {}", refresh))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_valid_access_token_passes() {
        let state = test_state();
        let access = state.codec.issue_access("alice", "a@b.com").unwrap();

        assert_eq!(
            send(app(state), Some(&format!("Bearer {}", access))).await,
            StatusCode::OK
        );
    }
}
