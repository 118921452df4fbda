use std::sync::LazyLock;

use prometheus::*;

use crate::mood::{Source, Strategy};

static METRIC_DETECT_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "moodmirror_detect_count",
        "count of the detect requests",
        &["strategy", "source"]
    )
    .unwrap()
});

static METRIC_DETECT_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "moodmirror_detect_duration",
        "duration of the decode and classify step in seconds",
        &["strategy"]
    )
    .unwrap()
});

static METRIC_RECOMMEND_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "moodmirror_recommend_count",
        "count of the recommend requests",
        &["status"]
    )
    .unwrap()
});

/// 记录一次情绪识别
pub fn observe_detect(strategy: Strategy, source: Source, duration: f64) {
    METRIC_DETECT_COUNT.with_label_values(&[strategy.as_str(), source.as_str()]).inc();
    METRIC_DETECT_DURATION.with_label_values(&[strategy.as_str()]).observe(duration);
}

/// 记录一次视频推荐
pub fn inc_recommend(ok: bool) {
    let status = if ok { "ok" } else { "error" };
    METRIC_RECOMMEND_COUNT.with_label_values(&[status]).inc();
}

/// 以文本格式导出所有指标
pub fn render() -> anyhow::Result<String> {
    Ok(TextEncoder::new().encode_to_string(&gather())?)
}
