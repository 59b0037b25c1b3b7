//! 사용자 디렉토리 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 인증(로그인/가입/토큰), 본인 계정 관리, 역할 게이트 뒤의 사용자 관리
//! 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use userdir_api::auth::JwtCodec;
use userdir_api::metrics::setup_metrics_recorder;
use userdir_api::middleware::{metrics_layer, RateLimitConfig, RateLimitState};
use userdir_api::openapi::swagger_ui_router;
use userdir_api::routes::create_api_router;
use userdir_api::state::AppState;
use userdir_core::{init_logging, AppConfig, LogConfig};

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://directory.example.com,https://admin.example.com`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            // 프로덕션: 특정 origin만 허용
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            // 개발: 모든 origin 허용
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// Rate Limit 비활성화 여부 확인.
fn is_rate_limit_disabled() -> bool {
    std::env::var("RATE_LIMIT_DISABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Rate Limit 설정 로드.
fn rate_limit_config() -> RateLimitConfig {
    let requests_per_minute = std::env::var("RATE_LIMIT_RPM")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60); // 자격증명 엔드포인트 기본: 분당 60회

    info!(
        requests_per_minute = requests_per_minute,
        "Rate limiting configured"
    );

    RateLimitConfig::new(requests_per_minute)
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // API 라우터 (자격증명 엔드포인트에 Rate Limit 조건부 적용)
    let rate_limit = if is_rate_limit_disabled() {
        info!("Rate limiting DISABLED (RATE_LIMIT_DISABLED=true)");
        None
    } else {
        Some(RateLimitState::new(rate_limit_config()))
    };

    let api_router = create_api_router(rate_limit).with_state(state);

    // 전체 라우터 조합
    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        // 기타 미들웨어
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    init_logging(LogConfig::from_env()).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting UserDir API server...");

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder();
    info!("Prometheus metrics recorder initialized");

    // 설정 로드 (config/default.toml, 없으면 기본값 + USERDIR__* 환경변수)
    let config = match AppConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "설정 파일 로드 실패, 기본값 사용");
            AppConfig::default()
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("소켓 주소 설정이 유효하지 않습니다. server.host/server.port를 확인하세요")?;

    // DB 연결 (필수. 모든 작업이 저장소를 통과)
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL 환경변수가 필요합니다")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&database_url)
        .await
        .context("데이터베이스 연결 실패")?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("데이터베이스 연결 확인 실패")?;
    info!("Connected to PostgreSQL successfully");

    // 마이그레이션 적용
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("마이그레이션 실패")?;

    // 서명 키 로드. 한 번만 읽어 불변으로 유지하고 실패 시 기동 중단
    let codec = JwtCodec::from_config(&config.auth).context("JWT 서명 키 로드 실패")?;
    info!(
        access_ttl_minutes = config.auth.access_token_expire_minutes,
        refresh_ttl_days = config.auth.refresh_token_expire_days,
        "JWT codec initialized (RS256)"
    );

    // AppState 생성
    let state = Arc::new(AppState::new(pool, codec));
    info!(version = %state.version, "Application state initialized");

    // 라우터 생성
    let app = create_router(state, metrics_handle);

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown 처리
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료를 시작합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
