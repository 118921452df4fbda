use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use log::{debug, error, info};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use crate::decode::DecodedImage;
use crate::mood::{MoodClassifier, MoodResult, Source, Strategy};

/// 多尺度检测时每层的缩放步长
pub const SCALE_FACTOR: f64 = 1.1;
/// 候选框至少需要的相邻检测数
pub const MIN_NEIGHBORS: i32 = 5;
/// 最小人脸尺寸
pub const MIN_FACE_SIZE: i32 = 30;

/// 检测到人脸时给出的情绪，只表示“有人脸”，并不是真正的表情识别
pub const FACE_MOOD: &str = "surprised";
pub const FACE_CONFIDENCE: f64 = 0.8;

/// 人脸检测器
pub trait FaceDetector: Send + Sync {
    /// 在灰度图上检测人脸区域
    fn detect_faces(&self, gray: &Mat) -> Result<Vec<Rect>>;
}

/// 基于 OpenCV Haar 级联的人脸检测器
pub struct HaarFaceDetector {
    // detect_multi_scale 需要 &mut self
    cascade: Mutex<CascadeClassifier>,
}

impl HaarFaceDetector {
    /// 从 XML 文件加载级联分类器
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("级联分类器文件不存在: {}", path.display());
        }
        let filename = path.to_str().ok_or_else(|| anyhow!("无效的路径: {}", path.display()))?;
        let cascade = CascadeClassifier::new(filename)?;
        if cascade.empty()? {
            bail!("无法加载级联分类器: {}", path.display());
        }
        info!("已加载级联分类器: {}", path.display());
        Ok(Self { cascade: Mutex::new(cascade) })
    }
}

impl FaceDetector for HaarFaceDetector {
    fn detect_faces(&self, gray: &Mat) -> Result<Vec<Rect>> {
        let mut cascade = self.cascade.lock().map_err(|_| anyhow!("级联分类器锁已损坏"))?;
        let mut faces = Vector::<Rect>::new();
        cascade.detect_multi_scale(
            gray,
            &mut faces,
            SCALE_FACTOR,
            MIN_NEIGHBORS,
            0,
            Size::new(MIN_FACE_SIZE, MIN_FACE_SIZE),
            Size::default(),
        )?;
        Ok(faces.to_vec())
    }
}

/// 启发式分类器：只根据是否检测到人脸给出固定结果
pub struct HeuristicClassifier<D = HaarFaceDetector> {
    detector: D,
}

impl<D: FaceDetector> HeuristicClassifier<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    fn count_faces(&self, image: &DecodedImage) -> Result<usize> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(image.mat(), &mut gray, imgproc::COLOR_BGR2GRAY)?;
        Ok(self.detector.detect_faces(&gray)?.len())
    }
}

impl<D: FaceDetector> MoodClassifier for HeuristicClassifier<D> {
    fn strategy(&self) -> Strategy {
        Strategy::Heuristic
    }

    fn classify(&self, image: Option<&DecodedImage>) -> MoodResult {
        let Some(image) = image else {
            return MoodResult::fallback(Source::Unreadable);
        };
        match self.count_faces(image) {
            Ok(0) => MoodResult::fallback(Source::NoFaceFound),
            Ok(n) => {
                debug!("检测到 {n} 张人脸");
                MoodResult::new(FACE_MOOD, FACE_CONFIDENCE, Source::FaceDetected)
            }
            Err(e) => {
                error!("人脸检测失败: {e:#}");
                MoodResult::fallback(Source::DetectorError)
            }
        }
    }
}
