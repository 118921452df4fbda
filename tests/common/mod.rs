#![allow(dead_code)]

use anyhow::{Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use moodmirror::heuristic::FaceDetector;
use opencv::core::{CV_8UC3, Mat, Rect, Scalar, Vector};
use opencv::imgcodecs;
use opencv::prelude::*;

/// 生成一张纯色 PNG 并编码为 base64
pub fn png_base64(rows: i32, cols: i32) -> String {
    let mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(40., 80., 120., 0.))
        .unwrap();
    let mut buf = Vector::<u8>::new();
    imgcodecs::imencode(".png", &mat, &mut buf, &Vector::new()).unwrap();
    STANDARD.encode(buf.as_slice())
}

/// 总是返回固定数量人脸的检测器
pub struct FixedFaces(pub usize);

impl FaceDetector for FixedFaces {
    fn detect_faces(&self, _gray: &Mat) -> Result<Vec<Rect>> {
        Ok(vec![Rect::new(0, 0, 32, 32); self.0])
    }
}

/// 总是出错的检测器
pub struct BrokenDetector;

impl FaceDetector for BrokenDetector {
    fn detect_faces(&self, _gray: &Mat) -> Result<Vec<Rect>> {
        bail!("cascade is broken")
    }
}
