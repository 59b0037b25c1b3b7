//! 인증 API 라우트.
//!
//! 로그인/가입/토큰 재발급과 본인 계정 관리 API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/auth/login` - 로그인 (access + refresh 발급)
//! - `POST /api/v1/auth/register` - 가입 (생성 + 자격증명 발급)
//! - `POST /api/v1/auth/refresh-token` - Access Token 재발급 (refresh 토큰 필요)
//! - `GET /api/v1/auth/logout` - 로그아웃 (클라이언트측 토큰 폐기)
//! - `GET /api/v1/auth/me` - 현재 사용자 조회
//! - `PATCH /api/v1/auth/update-me` - 본인 정보 부분 수정
//! - `DELETE /api/v1/auth/delete-me` - 본인 계정 삭제

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use userdir_core::AuthError;

use crate::auth::{resolve_principal, AccessAuth, RefreshAuth, TokenPair};
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::metrics::{login_result_label, record_login_attempt, record_signup, record_token_issued};
use crate::repository::{NewUser, UserUpdate};
use crate::services::{CurrentUser, SessionService, UpdatedUser};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 로그인 요청. `username` 자리에 email을 넣어도 됩니다.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// username 또는 email
    pub username: String,
    /// 평문 비밀번호
    pub password: String,
}

/// 단순 메시지 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /api/v1/auth/login - 로그인
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = TokenPair),
        (status = 401, description = "비밀번호 불일치", body = ApiErrorResponse),
        (status = 403, description = "차단된 사용자", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    debug!(identifier = %request.username, "로그인 시도");

    let result = SessionService::login(
        &state.db_pool,
        &state.codec,
        &request.username,
        &request.password,
    )
    .await;

    record_login_attempt(login_result_label(&result.as_ref().map(|_| ())));

    let pair = result?;
    record_token_issued("access");
    record_token_issued("refresh");

    Ok(Json(pair))
}

/// POST /api/v1/auth/register - 가입
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = NewUser,
    responses(
        (status = 201, description = "가입 성공", body = TokenPair),
        (status = 401, description = "비밀번호 정책 미달", body = ApiErrorResponse),
        (status = 409, description = "username/email 중복", body = ApiErrorResponse),
        (status = 422, description = "요청 형식 오류", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<TokenPair>)> {
    input
        .validate()
        .map_err(|e| ApiError(AuthError::Validation(e.to_string())))?;

    let pair = SessionService::signup(&state.db_pool, &state.codec, input).await?;
    record_signup();
    record_token_issued("access");
    record_token_issued("refresh");

    Ok((StatusCode::CREATED, Json(pair)))
}

/// POST /api/v1/auth/refresh-token - Access Token 재발급
///
/// Refresh Token을 Bearer로 제시해야 합니다. Access Token으로는
/// 재발급할 수 없습니다.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-token",
    responses(
        (status = 200, description = "재발급 성공 (access만)", body = TokenPair),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse),
        (status = 403, description = "차단된 사용자", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    RefreshAuth(claims): RefreshAuth,
) -> ApiResult<Json<TokenPair>> {
    let pair = SessionService::refresh(&state.db_pool, &state.codec, &claims).await?;
    record_token_issued("access");

    Ok(Json(pair))
}

/// GET /api/v1/auth/logout - 로그아웃
///
/// 서버측 상태가 없으므로 클라이언트가 토큰을 버리는 것으로 충분합니다.
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "로그아웃", body = MessageResponse)),
    tag = "auth"
)]
pub async fn logout() -> Json<MessageResponse> {
    // TODO: jti 기반 denylist(TTL 포함)를 붙여 만료 전 refresh token 폐기 지원
    Json(MessageResponse {
        message: "Logged out. Discard your tokens.".to_string(),
    })
}

/// GET /api/v1/auth/me - 현재 사용자 조회
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "현재 사용자", body = CurrentUser),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
) -> ApiResult<Json<CurrentUser>> {
    let user = resolve_principal(&state.db_pool, &claims).await?;
    Ok(Json(SessionService::current_user(&claims, &user)))
}

/// PATCH /api/v1/auth/update-me - 본인 정보 부분 수정
#[utoipa::path(
    patch,
    path = "/api/v1/auth/update-me",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "수정 성공 (username 변경 시 새 토큰 포함)", body = UpdatedUser),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse),
        (status = 409, description = "username/email 중복", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<UpdatedUser>> {
    update
        .validate()
        .map_err(|e| ApiError(AuthError::Validation(e.to_string())))?;

    let updated = SessionService::update_self(&state.db_pool, &state.codec, &claims, update).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/auth/delete-me - 본인 계정 삭제
#[utoipa::path(
    delete,
    path = "/api/v1/auth/delete-me",
    responses(
        (status = 200, description = "삭제 성공", body = MessageResponse),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
) -> ApiResult<Json<MessageResponse>> {
    SessionService::delete_self(&state.db_pool, &claims).await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh-token", post(refresh))
        .route("/logout", get(logout))
        .route("/me", get(current_user))
        .route("/update-me", patch(update_me))
        .route("/delete-me", delete(delete_me))
}
