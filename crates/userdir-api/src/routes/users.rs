//! 사용자 관리 API 라우트 (관리자 전면).
//!
//! 다른 사용자 레코드에 대한 조회/수정/삭제 API를 제공합니다.
//! 조회/목록은 ADMIN·MODERATOR, 수정/삭제는 ADMIN만 통과합니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/users` - 전체 사용자 목록 (페이지네이션/필터/정렬)
//! - `GET /api/v1/users/{id}` - 사용자 상세 조회
//! - `PATCH /api/v1/users/{id}` - 사용자 수정 (역할/차단 포함)
//! - `DELETE /api/v1/users/{id}` - 사용자 삭제

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use userdir_core::AuthError;

use crate::auth::AccessAuth;
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::repository::{AdminUserUpdate, Pagination, UserView};
use crate::routes::auth::MessageResponse;
use crate::services::AdminService;
use crate::state::AppState;

// ================================================================================================
// Response Types
// ================================================================================================

/// 사용자 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct UsersListResponse {
    /// 사용자 목록
    pub users: Vec<UserView>,
    /// 이 페이지의 개수
    pub count: usize,
    /// 페이지 번호
    pub page: u32,
}

// ================================================================================================
// Handlers
// ================================================================================================

/// GET /api/v1/users - 전체 사용자 목록
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("page" = Option<u32>, Query, description = "페이지 번호 (1부터, 기본 1)"),
        ("limit" = Option<u32>, Query, description = "페이지 크기 (기본 30)"),
        ("filter_by_name" = Option<String>, Query, description = "name 일치 필터"),
        ("sort_by" = Option<String>, Query, description = "정렬 컬럼 (id|name|surname|username|email|modified_at|created_at)"),
        ("order_by" = Option<String>, Query, description = "정렬 방향 (ASC|DESC)")
    ),
    responses(
        (status = 200, description = "사용자 목록", body = UsersListResponse),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse),
        (status = 403, description = "권한 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<UsersListResponse>> {
    pagination
        .validate()
        .map_err(|e| ApiError(AuthError::Validation(e.to_string())))?;

    debug!(page = pagination.page, limit = pagination.limit, "사용자 목록 조회");

    let users = AdminService::list_users(&state.db_pool, &claims, &pagination).await?;
    let count = users.len();

    Ok(Json(UsersListResponse {
        users,
        count,
        page: pagination.page,
    }))
}

/// GET /api/v1/users/{id} - 사용자 상세 조회
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자", body = UserView),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse),
        (status = 403, description = "권한 없음", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserView>> {
    let user = AdminService::get_user(&state.db_pool, &claims, id).await?;
    Ok(Json(user))
}

/// PATCH /api/v1/users/{id} - 사용자 수정 (ADMIN 전용)
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "사용자 ID")),
    request_body = AdminUserUpdate,
    responses(
        (status = 200, description = "수정된 사용자", body = UserView),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse),
        (status = 403, description = "권한 없음", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse),
        (status = 409, description = "username/email 중복", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
    Path(id): Path<Uuid>,
    Json(update): Json<AdminUserUpdate>,
) -> ApiResult<Json<UserView>> {
    update
        .validate()
        .map_err(|e| ApiError(AuthError::Validation(e.to_string())))?;

    let user = AdminService::update_user(&state.db_pool, &claims, id, update).await?;
    Ok(Json(user))
}

/// DELETE /api/v1/users/{id} - 사용자 삭제 (ADMIN 전용)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "삭제 성공", body = MessageResponse),
        (status = 401, description = "유효하지 않은 토큰", body = ApiErrorResponse),
        (status = 403, description = "권한 없음", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AccessAuth(claims): AccessAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    AdminService::delete_user(&state.db_pool, &claims, id).await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// 사용자 관리 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).patch(update_user).delete(delete_user))
}
