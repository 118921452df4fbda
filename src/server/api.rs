use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use axum::Json;
use axum::extract::State;
use log::info;
use tokio::task::block_in_place;

use super::error::Result;
use super::state::AppState;
use super::types::*;
use crate::metrics;
use crate::mood::{MoodResult, detect_mood};

/// 健康检查
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, body = HealthResponse),
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "pyservice running".to_string() })
}

/// 识别图片中人物的情绪
///
/// 图片无效或分类器出错时返回降级结果，不会返回错误
#[utoipa::path(
    post,
    path = "/detect",
    request_body = DetectRequest,
    responses(
        (status = 200, body = MoodResult),
    )
)]
pub async fn detect_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<DetectRequest>,
) -> Json<MoodResult> {
    let start = Instant::now();

    let result = block_in_place(|| detect_mood(state.classifier.as_ref(), &data.image_base64));

    let elapsed = start.elapsed();
    metrics::observe_detect(state.classifier.strategy(), result.source, elapsed.as_secs_f64());
    info!(
        "识别结果: {} ({:.2}, {})，耗时 {}ms",
        result.detected_mood,
        result.confidence,
        result.source,
        elapsed.as_millis()
    );

    Json(result)
}

/// 根据情绪推荐视频
///
/// 只在模型策略下提供
#[utoipa::path(
    post,
    path = "/recommend",
    request_body = RecommendRequest,
    responses(
        (status = 200, body = RecommendResponse),
        (status = 500, description = "视频搜索服务调用失败"),
    )
)]
pub async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>> {
    let recommender = state.recommender.as_ref().ok_or_else(|| anyhow!("当前策略不支持视频推荐"))?;

    let result = recommender.recommend(&data.mood).await;
    metrics::inc_recommend(result.is_ok());

    let items = result?;
    info!("为情绪 {:?} 推荐了 {} 个视频", data.mood, items.len());
    Ok(Json(RecommendResponse { items }))
}

/// 导出 prometheus 指标
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, body = String, content_type = "text/plain"),
    )
)]
pub async fn metrics_handler() -> Result<String> {
    Ok(metrics::render()?)
}
