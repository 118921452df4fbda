mod common;

use std::time::Duration;

use anyhow::{Result, anyhow};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use moodmirror::heuristic::HeuristicClassifier;
use moodmirror::model::{EmotionAnalysis, EmotionModel, EmotionReading, ModelClassifier};
use moodmirror::recommend::{HttpVideoSearch, Recommender};
use moodmirror::server::{AppState, create_app};
use opencv::core::Mat;
use rstest::*;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{BrokenDetector, FixedFaces, png_base64};

/// 返回固定结果的情绪模型
struct ScriptedModel(Option<EmotionAnalysis>);

impl EmotionModel for ScriptedModel {
    fn analyze(&self, _rgb: &Mat) -> Result<EmotionAnalysis> {
        self.0.clone().ok_or_else(|| anyhow!("model is not available"))
    }
}

fn happy() -> EmotionAnalysis {
    EmotionAnalysis::Many(vec![EmotionReading {
        dominant_emotion: Some("happy".to_string()),
        emotion: [("happy".to_string(), 92.0), ("neutral".to_string(), 8.0)].into(),
    }])
}

fn model_app(model: ScriptedModel, search_url: &str) -> Router {
    let search = HttpVideoSearch::new(search_url, Duration::from_secs(10)).unwrap();
    let state = AppState::new(Box::new(ModelClassifier::new(model)), Some(Recommender::new(search)));
    create_app(state)
}

fn heuristic_app(faces: usize) -> Router {
    create_app(AppState::new(Box::new(HeuristicClassifier::new(FixedFaces(faces))), None))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[fixture]
fn image() -> String {
    png_base64(48, 48)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_health() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = heuristic_app(0).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({"status": "pyservice running"}));
}

#[rstest]
#[case(0, json!({"detectedMood": "neutral", "confidence": 0.4, "source": "no-face-found"}))]
#[case(1, json!({"detectedMood": "surprised", "confidence": 0.8, "source": "face-detected"}))]
#[case(4, json!({"detectedMood": "surprised", "confidence": 0.8, "source": "face-detected"}))]
#[tokio::test(flavor = "multi_thread")]
async fn test_heuristic_detect(image: String, #[case] faces: usize, #[case] expected: Value) {
    let (status, body) =
        post_json(heuristic_app(faces), "/detect", json!({"imageBase64": image})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_heuristic_detector_error(image: String) {
    let app = create_app(AppState::new(Box::new(HeuristicClassifier::new(BrokenDetector)), None));
    let (status, body) = post_json(app.clone(), "/detect", json!({"imageBase64": image})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"detectedMood": "neutral", "confidence": 0.4, "source": "detector-error"})
    );

    // 无效图片和检测器出错的来源不同
    let (_, invalid) = post_json(app, "/detect", json!({"imageBase64": "%%%"})).await;
    assert_eq!(invalid["source"], "error");
}

#[rstest]
#[case("not-valid-base64!!!")]
#[case("data:image/png;base64,aGVsbG8gd29ybGQ=")]
#[case("")]
#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_image_never_fails(#[case] payload: &str) {
    let (status, body) =
        post_json(heuristic_app(1), "/detect", json!({"imageBase64": payload})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"detectedMood": "neutral", "confidence": 0.4, "source": "error"}));

    let app = model_app(ScriptedModel(Some(happy())), "http://127.0.0.1:9");
    let (status, body) = post_json(app, "/detect", json!({"imageBase64": payload})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"detectedMood": "neutral", "confidence": 0.4, "source": "invalid-image"})
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_model_detect(image: String) {
    let app = model_app(ScriptedModel(Some(happy())), "http://127.0.0.1:9");
    let (status, body) = post_json(app, "/detect", json!({"imageBase64": image})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"detectedMood": "happy", "confidence": 0.92, "source": "deepface"}));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_data_url_prefix(image: String) {
    let app = model_app(ScriptedModel(Some(happy())), "http://127.0.0.1:9");
    let (_, plain) = post_json(app.clone(), "/detect", json!({"imageBase64": image})).await;
    let prefixed = format!("data:image/png;base64,{image}");
    let (_, body) = post_json(app, "/detect", json!({"imageBase64": prefixed})).await;
    assert_eq!(plain, body);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_model_error_degrades(image: String) {
    let app = model_app(ScriptedModel(None), "http://127.0.0.1:9");
    let (status, body) = post_json(app, "/detect", json!({"imageBase64": image})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"detectedMood": "neutral", "confidence": 0.4, "source": "deepface-error"})
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_recommend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/youtube/search"))
        .and(query_param("q", "chill lofi music"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"videoId": "a", "title": "lofi 1"},
                {"videoId": "a", "title": "lofi 1 again"},
                {"videoId": "b", "title": "lofi 2"},
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = model_app(ScriptedModel(None), &server.uri());
    let (status, body) = post_json(app, "/recommend", json!({"mood": "Calm"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"items": [{"videoId": "a", "title": "lofi 1"}, {"videoId": "b", "title": "lofi 2"}]})
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_recommend_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/youtube/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let app = model_app(ScriptedModel(None), &server.uri());
    let (status, _) = post_json(app, "/recommend", json!({"mood": "happy"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_heuristic_has_no_recommend() {
    let (status, _) = post_json(heuristic_app(0), "/recommend", json!({"mood": "happy"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_metrics(image: String) {
    let app = heuristic_app(1);
    post_json(app.clone(), "/detect", json!({"imageBase64": image})).await;

    let request = Request::get("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("moodmirror_detect_count"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_openapi_matches_routes() {
    let (status, doc) = get_json(heuristic_app(0), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths = doc["paths"].as_object().unwrap();
    for route in ["/health", "/detect", "/metrics"] {
        assert!(paths.contains_key(route), "{route} is not documented");
    }
    assert!(!paths.contains_key("/recommend"));

    let app = model_app(ScriptedModel(None), "http://127.0.0.1:9");
    let (_, doc) = get_json(app, "/api-docs/openapi.json").await;
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/recommend"));
    assert!(paths.contains_key("/metrics"));
}
