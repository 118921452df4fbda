use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use crate::cli::SubCommandExtend;
use crate::config::{ClassifierOptions, SearchOptions};
use crate::Opts;
use crate::mood::Strategy;
use crate::server::{self, DEFAULT_ALLOW_ORIGINS, DEFAULT_BODY_LIMIT};

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub classifier: ClassifierOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
    /// 允许跨域访问的来源，可以指定多次
    #[arg(
        long = "allow-origin",
        value_name = "ORIGIN",
        default_values = DEFAULT_ALLOW_ORIGINS.iter().copied()
    )]
    pub allow_origins: Vec<String>,
    /// 请求体大小上限，单位为字节
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let classifier = self.classifier.load()?;

        // 只有模型策略提供视频推荐
        let recommender = match self.classifier.strategy {
            Strategy::Model => Some(self.search.recommender()?),
            Strategy::Heuristic => None,
        };

        // 创建应用状态
        let mut state = server::AppState::new(classifier, recommender);
        state.allow_origins = self.allow_origins.clone();
        state.body_limit = self.body_limit;

        // 创建应用
        let app = server::create_app(state);

        // 启动服务器
        info!(
            "服务器启动：http://{}，策略：{}",
            &self.addr,
            self.classifier.strategy.as_str()
        );
        if self.classifier.strategy == Strategy::Model {
            info!("视频搜索服务：{}", self.search.search_base_url);
        }
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
