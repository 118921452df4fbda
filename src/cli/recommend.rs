use anyhow::Result;
use clap::Parser;
use serde_json::Value;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, OutputFormat, SearchOptions};
use crate::recommend::RecommendationItem;

#[derive(Parser, Debug, Clone)]
pub struct RecommendCommand {
    #[command(flatten)]
    pub search: SearchOptions,
    /// 情绪标签
    pub mood: String,
}

impl SubCommandExtend for RecommendCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let recommender = self.search.recommender()?;
        let items = recommender.recommend(&self.mood).await?;
        print_items(&items, opts.output_format)
    }
}

fn print_items(items: &[RecommendationItem], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?)
        }
        OutputFormat::Table => {
            for item in items {
                let title = item.0.get("title").and_then(Value::as_str).unwrap_or_default();
                println!("{}\t{}", item.video_id().unwrap_or_default(), title);
            }
        }
    }
    Ok(())
}
