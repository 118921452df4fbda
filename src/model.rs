use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail, ensure};
use log::{debug, error, info};
use opencv::core::{CV_32F, Mat, Scalar, Size};
use opencv::dnn::{self, Net};
use opencv::imgproc;
use opencv::prelude::*;
use serde::Deserialize;

use crate::decode::DecodedImage;
use crate::heuristic::{FaceDetector, HaarFaceDetector};
use crate::mood::{FALLBACK_MOOD, MoodClassifier, MoodResult, Source, Strategy};

/// 主要情绪不在分数表中时使用的分数（百分比）
pub const FALLBACK_SCORE: f64 = 40.0;

/// FER+ 模型输出的情绪标签，顺序与输出向量一致
pub const FERPLUS_LABELS: [&str; 8] =
    ["neutral", "happy", "surprise", "sad", "angry", "disgust", "fear", "contempt"];

/// FER+ 模型输入尺寸
const FERPLUS_INPUT_SIZE: i32 = 64;

/// 单张人脸的情绪识别结果
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmotionReading {
    /// 分数最高的情绪
    pub dominant_emotion: Option<String>,
    /// 每种情绪的分数，单位为百分比
    #[serde(default)]
    pub emotion: HashMap<String, f64>,
}

impl EmotionReading {
    pub fn to_mood_result(&self) -> MoodResult {
        let dominant = self.dominant_emotion.as_deref().unwrap_or(FALLBACK_MOOD);
        let score = self.emotion.get(dominant).copied().unwrap_or(FALLBACK_SCORE);
        MoodResult::new(dominant, score / 100.0, Source::Model)
    }
}

/// 模型输出：可能是单个结果，也可能是每张人脸一个结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EmotionAnalysis {
    Many(Vec<EmotionReading>),
    Single(EmotionReading),
}

impl EmotionAnalysis {
    /// 取第一个结果，空列表视为模型错误
    pub fn into_first(self) -> Result<EmotionReading> {
        match self {
            EmotionAnalysis::Single(reading) => Ok(reading),
            EmotionAnalysis::Many(readings) => {
                readings.into_iter().next().ok_or_else(|| anyhow!("模型没有返回任何结果"))
            }
        }
    }
}

/// 情绪识别模型，输入为 RGB 图像
///
/// 即使找不到人脸也要尽量给出结果。
pub trait EmotionModel: Send + Sync {
    fn analyze(&self, rgb: &Mat) -> Result<EmotionAnalysis>;
}

/// 基于模型的分类器，任何模型错误都会降级为 `deepface-error`
pub struct ModelClassifier<M> {
    model: M,
}

impl<M: EmotionModel> ModelClassifier<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    fn read(&self, image: &DecodedImage) -> Result<EmotionReading> {
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(image.mat(), &mut rgb, imgproc::COLOR_BGR2RGB)?;
        self.model.analyze(&rgb)?.into_first()
    }
}

impl<M: EmotionModel> MoodClassifier for ModelClassifier<M> {
    fn strategy(&self) -> Strategy {
        Strategy::Model
    }

    fn classify(&self, image: Option<&DecodedImage>) -> MoodResult {
        let Some(image) = image else {
            return MoodResult::fallback(Source::InvalidImage);
        };
        match self.read(image) {
            Ok(reading) => reading.to_mood_result(),
            Err(e) => {
                error!("情绪模型调用失败: {e:#}");
                MoodResult::fallback(Source::ModelError)
            }
        }
    }
}

/// FER+ ONNX 情绪模型
///
/// 有人脸检测器时对每张人脸分别识别；没有检测到人脸时对整张图片识别。
pub struct FerPlusModel<D = HaarFaceDetector> {
    net: Mutex<Net>,
    faces: Option<D>,
}

impl<D: FaceDetector> FerPlusModel<D> {
    /// 加载 ONNX 模型文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("模型文件不存在: {}", path.display());
        }
        let filename = path.to_str().ok_or_else(|| anyhow!("无效的路径: {}", path.display()))?;
        let net = dnn::read_net_from_onnx(filename)?;
        if net.empty()? {
            bail!("无法加载模型: {}", path.display());
        }
        info!("已加载情绪模型: {}", path.display());
        Ok(Self { net: Mutex::new(net), faces: None })
    }

    pub fn with_face_detector(mut self, detector: D) -> Self {
        self.faces = Some(detector);
        self
    }

    fn read_face(&self, face: &Mat) -> Result<EmotionReading> {
        let size = Size::new(FERPLUS_INPUT_SIZE, FERPLUS_INPUT_SIZE);
        let mut resized = Mat::default();
        imgproc::resize(face, &mut resized, size, 0., 0., imgproc::INTER_AREA)?;
        // FER+ 的输入是 0~255 的灰度值，不做归一化
        let blob =
            dnn::blob_from_image(&resized, 1.0, size, Scalar::default(), false, false, CV_32F)?;

        let output = {
            let mut net = self.net.lock().map_err(|_| anyhow!("模型锁已损坏"))?;
            net.set_input_def(&blob)?;
            net.forward_single_def()?
        };
        scores_to_reading(output.data_typed::<f32>()?)
    }
}

impl<D: FaceDetector> EmotionModel for FerPlusModel<D> {
    fn analyze(&self, rgb: &Mat) -> Result<EmotionAnalysis> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(rgb, &mut gray, imgproc::COLOR_RGB2GRAY)?;

        let regions = match &self.faces {
            Some(detector) => detector.detect_faces(&gray)?,
            None => vec![],
        };
        if regions.is_empty() {
            debug!("未检测到人脸，对整张图片进行识别");
            return Ok(EmotionAnalysis::Single(self.read_face(&gray)?));
        }

        let readings = regions
            .into_iter()
            .map(|rect| {
                let face = Mat::roi(&gray, rect)?;
                self.read_face(&face)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(EmotionAnalysis::Many(readings))
    }
}

/// 将模型输出的 logits 转换为百分比分数
pub fn scores_to_reading(logits: &[f32]) -> Result<EmotionReading> {
    ensure!(
        logits.len() == FERPLUS_LABELS.len(),
        "模型输出维度错误: {}，应为 {}",
        logits.len(),
        FERPLUS_LABELS.len()
    );

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.iter().map(|&x| ((x - max) as f64).exp()).collect::<Vec<_>>();
    let sum: f64 = exp.iter().sum();
    ensure!(sum.is_finite() && sum > 0.0, "模型输出无效");

    let mut dominant = 0;
    for (i, v) in exp.iter().enumerate() {
        if *v > exp[dominant] {
            dominant = i;
        }
    }

    let emotion = FERPLUS_LABELS
        .iter()
        .zip(&exp)
        .map(|(label, v)| (label.to_string(), v / sum * 100.0))
        .collect();

    Ok(EmotionReading { dominant_emotion: Some(FERPLUS_LABELS[dominant].to_string()), emotion })
}
