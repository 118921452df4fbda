use std::borrow::Cow;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 返回的最大视频数量
pub const MAX_ITEMS: usize = 15;
/// 单次搜索请求的超时时间
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
/// 未知情绪使用的搜索词
pub const FALLBACK_QUERIES: &[&str] = &["top music hits"];

/// 根据情绪选择搜索词，不区分大小写
pub fn mood_queries(mood: &str) -> &'static [&'static str] {
    match mood.to_lowercase().as_str() {
        "happy" => &["happy pop music"],
        "sad" => &["sad songs playlist"],
        "angry" => &["angry workout music"],
        "calm" => &["chill lofi music"],
        _ => FALLBACK_QUERIES,
    }
}

/// 视频搜索服务返回的条目，除 `videoId` 外的字段原样透传
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationItem(pub Map<String, Value>);

impl RecommendationItem {
    /// 有效的 `videoId`：非空字符串、非零数字或 `true`
    fn id_value(&self) -> Option<&Value> {
        self.0.get("videoId").filter(|id| match id {
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.as_f64() != Some(0.0),
            Value::Bool(b) => *b,
            _ => false,
        })
    }

    /// 非字符串的 id 以 JSON 文本表示
    pub fn video_id(&self) -> Option<Cow<'_, str>> {
        self.id_value().map(|id| match id {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        })
    }
}

/// 按 `videoId` 去重，保留第一次出现的条目，没有 `videoId` 的条目直接丢弃
///
/// 去重键是 id 的 JSON 文本，所以 `"1"` 和 `1` 是不同的视频
pub fn dedup_items(
    items: impl IntoIterator<Item = RecommendationItem>,
    limit: usize,
) -> Vec<RecommendationItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| match item.id_value() {
            Some(id) => seen.insert(id.to_string()),
            None => false,
        })
        .take(limit)
        .collect()
}

/// 视频搜索服务
pub trait VideoSearch: Send + Sync {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<RecommendationItem>>> + Send;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RecommendationItem>,
}

/// 通过 HTTP 调用 `GET /api/youtube/search?q=<query>`
pub struct HttpVideoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVideoSearch {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl VideoSearch for HttpVideoSearch {
    async fn search(&self, query: &str) -> Result<Vec<RecommendationItem>> {
        let url = format!("{}/api/youtube/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?;
        let body: SearchResponse = response.json().await?;
        Ok(body.items)
    }
}

/// 视频推荐
///
/// 依次执行每个搜索词，任意一次搜索失败都会使整个推荐失败，不返回部分结果。
pub struct Recommender<S = HttpVideoSearch> {
    search: S,
    queries: fn(&str) -> &'static [&'static str],
}

impl<S: VideoSearch> Recommender<S> {
    pub fn new(search: S) -> Self {
        Self::with_queries(search, mood_queries)
    }

    /// 使用自定义的情绪到搜索词映射
    pub fn with_queries(search: S, queries: fn(&str) -> &'static [&'static str]) -> Self {
        Self { search, queries }
    }

    pub async fn recommend(&self, mood: &str) -> Result<Vec<RecommendationItem>> {
        let mut items = Vec::new();
        for query in (self.queries)(mood) {
            let found =
                self.search.search(query).await.with_context(|| format!("视频搜索失败: {query}"))?;
            debug!("搜索 {query:?} 得到 {} 个结果", found.len());
            items.extend(found);
        }
        Ok(dedup_items(items, MAX_ITEMS))
    }
}
