use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::decode::{DecodedImage, decode_base64_image};

/// 无法得到有效识别结果时返回的情绪
pub const FALLBACK_MOOD: &str = "neutral";
/// 无法得到有效识别结果时返回的置信度
pub const FALLBACK_CONFIDENCE: f64 = 0.4;

/// 情绪识别策略，部署时二选一
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Haar 级联人脸检测，只判断有没有人脸
    Heuristic,
    /// 情绪分类模型
    Model,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Heuristic => "heuristic",
            Strategy::Model => "model",
        }
    }
}

/// 识别结果的来源，调用方依赖它区分真实结果和降级结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Source {
    /// 模型识别成功
    #[serde(rename = "deepface")]
    Model,
    /// 模型调用失败
    #[serde(rename = "deepface-error")]
    ModelError,
    /// 图片无法解码（模型策略）
    #[serde(rename = "invalid-image")]
    InvalidImage,
    /// 检测到人脸（启发式策略）
    #[serde(rename = "face-detected")]
    FaceDetected,
    /// 没有检测到人脸（启发式策略）
    #[serde(rename = "no-face-found")]
    NoFaceFound,
    /// 图片无法读取（启发式策略）
    #[serde(rename = "error")]
    Unreadable,
    /// 人脸检测出错（启发式策略）
    #[serde(rename = "detector-error")]
    DetectorError,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Model => "deepface",
            Source::ModelError => "deepface-error",
            Source::InvalidImage => "invalid-image",
            Source::FaceDetected => "face-detected",
            Source::NoFaceFound => "no-face-found",
            Source::Unreadable => "error",
            Source::DetectorError => "detector-error",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 情绪识别结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodResult {
    /// 情绪标签
    pub detected_mood: String,
    /// 置信度，范围从 0 到 1
    pub confidence: f64,
    /// 结果来源
    pub source: Source,
}

impl MoodResult {
    pub fn new(mood: impl Into<String>, confidence: f64, source: Source) -> Self {
        Self { detected_mood: mood.into(), confidence: confidence.clamp(0.0, 1.0), source }
    }

    /// 降级结果：neutral / 0.4
    pub fn fallback(source: Source) -> Self {
        Self::new(FALLBACK_MOOD, FALLBACK_CONFIDENCE, source)
    }
}

/// 情绪分类器
///
/// `image` 为 `None` 表示图片解码失败，实现需要返回对应的降级结果。
/// 分类器在启动时初始化一次，之后在多个请求间只读共享。
pub trait MoodClassifier: Send + Sync {
    fn strategy(&self) -> Strategy;

    fn classify(&self, image: Option<&DecodedImage>) -> MoodResult;
}

/// 解码 base64 图片并识别情绪，永远不会失败
pub fn detect_mood(classifier: &dyn MoodClassifier, payload: &str) -> MoodResult {
    let image = decode_base64_image(payload);
    classifier.classify(image.as_ref())
}
