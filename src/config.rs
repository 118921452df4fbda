use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;

use crate::cli::*;
use crate::heuristic::{HaarFaceDetector, HeuristicClassifier};
use crate::model::{FerPlusModel, ModelClassifier};
use crate::mood::{MoodClassifier, Strategy};
use crate::recommend::{HttpVideoSearch, Recommender};

#[derive(Parser, Debug, Clone)]
pub struct ClassifierOptions {
    /// 情绪识别策略
    #[arg(long, value_enum, default_value_t = Strategy::Model)]
    pub strategy: Strategy,
    /// Haar 级联人脸检测器文件
    #[arg(
        long,
        value_name = "PATH",
        default_value = "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml"
    )]
    pub cascade: PathBuf,
    /// FER+ 情绪模型文件（ONNX 格式）
    #[arg(long, value_name = "PATH", default_value = "emotion-ferplus-8.onnx")]
    pub model: PathBuf,
}

impl ClassifierOptions {
    /// 加载所选策略的分类器
    pub fn load(&self) -> Result<Box<dyn MoodClassifier>> {
        match self.strategy {
            Strategy::Heuristic => {
                let detector = HaarFaceDetector::load(&self.cascade)?;
                Ok(Box::new(HeuristicClassifier::new(detector)))
            }
            Strategy::Model => {
                let mut model = FerPlusModel::<HaarFaceDetector>::load(&self.model)?;
                // 没有人脸检测器时对整张图片识别
                match HaarFaceDetector::load(&self.cascade) {
                    Ok(detector) => model = model.with_face_detector(detector),
                    Err(e) => warn!("不使用人脸检测: {e:#}"),
                }
                Ok(Box::new(ModelClassifier::new(model)))
            }
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 视频搜索服务地址
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:5000")]
    pub search_base_url: String,
    /// 每次搜索请求的超时时间，单位为秒
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub search_timeout: u64,
}

impl SearchOptions {
    pub fn recommender(&self) -> Result<Recommender> {
        let search = HttpVideoSearch::new(
            &self.search_base_url,
            std::time::Duration::from_secs(self.search_timeout),
        )?;
        Ok(Recommender::new(search))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "moodmirror", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 输出格式
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 启动 HTTP 服务
    Server(ServerCommand),
    /// 识别本地图片中人物的情绪
    Detect(DetectCommand),
    /// 根据情绪推荐视频
    Recommend(RecommendCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}
