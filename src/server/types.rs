use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::recommend::RecommendationItem;

/// 情绪识别请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectRequest {
    /// base64 编码的图片，可以带有 data URL 前缀
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
}

/// 视频推荐请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendRequest {
    /// 情绪标签，不区分大小写
    pub mood: String,
}

/// 视频推荐响应
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendResponse {
    /// 按 `videoId` 去重后的视频，最多 15 个
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<RecommendationItem>,
}

/// 健康检查响应
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
