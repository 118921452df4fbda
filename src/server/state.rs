use crate::mood::MoodClassifier;
use crate::recommend::Recommender;

/// 默认允许的跨域来源
pub const DEFAULT_ALLOW_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];
/// 默认请求体大小上限：10M
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024 * 10;

/// 应用状态
///
/// 启动时初始化，之后所有请求只读共享。
pub struct AppState {
    /// 情绪分类器
    pub classifier: Box<dyn MoodClassifier>,
    /// 视频推荐，只有模型策略提供
    pub recommender: Option<Recommender>,
    /// 允许跨域访问的来源
    pub allow_origins: Vec<String>,
    /// 请求体大小上限
    pub body_limit: usize,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(classifier: Box<dyn MoodClassifier>, recommender: Option<Recommender>) -> Self {
        AppState {
            classifier,
            recommender,
            allow_origins: DEFAULT_ALLOW_ORIGINS.iter().map(|s| s.to_string()).collect(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}
