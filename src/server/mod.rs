mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use log::warn;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::error::AppError;
pub use self::state::*;
pub use self::types::*;

#[derive(OpenApi)]
#[openapi(
    paths(api::health_handler, api::detect_handler, api::metrics_handler),
    components(schemas(
        types::DetectRequest,
        types::HealthResponse,
        crate::mood::MoodResult,
        crate::mood::Source,
    ))
)]
pub struct ApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(api::recommend_handler),
    components(schemas(types::RecommendRequest, types::RecommendResponse))
)]
struct RecommendApiDoc;

/// 生成和已注册路由一致的 OpenAPI 文档
pub fn openapi(with_recommend: bool) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if with_recommend {
        doc.merge(RecommendApiDoc::openapi());
    }
    doc
}

/// 构建API服务器
///
/// `/recommend` 只有在提供了视频推荐时才会注册
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.allow_origins);
    let body_limit = state.body_limit;
    let with_recommend = state.recommender.is_some();

    let mut router = Router::new()
        .route("/health", get(api::health_handler))
        .route("/detect", post(api::detect_handler))
        .route("/metrics", get(api::metrics_handler));
    if with_recommend {
        router = router.route("/recommend", post(api::recommend_handler));
    }

    router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi(with_recommend)))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .with_state(Arc::new(state))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("忽略无效的跨域来源: {origin}");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
