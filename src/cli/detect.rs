use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{ClassifierOptions, Opts, OutputFormat};
use crate::decode::decode_image_bytes;
use crate::mood::MoodResult;

#[derive(Parser, Debug, Clone)]
pub struct DetectCommand {
    #[command(flatten)]
    pub classifier: ClassifierOptions,
    /// 图片路径
    pub image: PathBuf,
}

impl SubCommandExtend for DetectCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let bytes = tokio::fs::read(&self.image)
            .await
            .with_context(|| format!("无法读取图片: {}", self.image.display()))?;

        let classifier = self.classifier.load()?;
        let result = block_in_place(|| {
            let image = decode_image_bytes(&bytes);
            if let Some(image) = &image {
                debug!("图片尺寸: {:?}", image.size());
            }
            classifier.classify(image.as_ref())
        });

        print_result(&result, opts.output_format)
    }
}

fn print_result(result: &MoodResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            println!("{}\t{:.2}\t{}", result.detected_mood, result.confidence, result.source);
        }
    }
    Ok(())
}
