//! End-to-end tests for the HTTP layer.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, over a
//! mock page source and a scripted model.

use std::sync::Arc;
use std::time::Duration;

use asset_extract::{ExtractorConfig, MockPageSource, ResilientFetchExtractor};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use server_core::{
    kernel::test_dependencies::{MockChunk, MockModel},
    kernel::BaseAnalysisModel,
    server::{build_app, routes::STREAM_TIMEOUT_NOTICE, AppState},
    FetchFailurePolicy,
};
use tower::ServiceExt;

const HGLG_PAGE: &str = "<div>Cotação atual R$ 160,12</div><div>DY (12M) 8,74%</div>";

struct TestApp {
    router: Router,
    source: MockPageSource,
    model: MockModel,
}

fn app_with(source: MockPageSource, model: Option<MockModel>, policy: FetchFailurePolicy) -> TestApp {
    let config = ExtractorConfig::new()
        .with_base_url("https://data.test")
        .with_timeout(Duration::from_secs(12));
    let model_handle = model.clone().unwrap_or_default();
    let state = AppState {
        extractor: ResilientFetchExtractor::with_source(config, source.clone()),
        model: model.map(|m| Arc::new(m) as Arc<dyn BaseAnalysisModel>),
        model_timeout: Duration::from_secs(45),
        fetch_failure_policy: policy,
    };
    TestApp {
        router: build_app(state),
        source,
        model: model_handle,
    }
}

fn default_app(model: MockModel) -> TestApp {
    app_with(
        MockPageSource::new().with_page("https://data.test/fiis/hglg11/", HGLG_PAGE),
        Some(model),
        FetchFailurePolicy::Abort,
    )
}

fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, String, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

fn fii_request() -> serde_json::Value {
    serde_json::json!({
        "tipoInvestimento": "fii",
        "ativo": "hglg",
        "perfilInvestidor": "moderado",
        "focoAnalise": "dividendos",
        "dataAnalise": "2025-01-10"
    })
}

#[tokio::test]
async fn test_health() {
    let app = default_app(MockModel::new());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, _, body) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_streamed_analysis_with_market_data() {
    let model = MockModel::new().with_chunks(vec![
        MockChunk::Text("## HGLG11\n".into()),
        MockChunk::Text("- DY 12m: 8,74%".into()),
    ]);
    let app = default_app(model);

    let (status, content_type, body) = send(app.router, post("/api/analysis", fii_request())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/plain; charset=utf-8");
    assert_eq!(body, "## HGLG11\n- DY 12m: 8,74%");

    let prompt = app.model.last_prompt().unwrap();
    assert!(prompt.contains("Analise o FII hglg"));
    assert!(prompt.contains("fonte: https://data.test/fiis/hglg11/"));
    assert!(prompt.contains("DY (12M) 8,74%"));
    assert_eq!(app.source.call_count(), 1);
}

#[tokio::test]
async fn test_whole_response_mode() {
    let app = default_app(MockModel::new().with_response("Análise pronta."));

    let (status, _, body) = send(app.router, post("/api/analysis?stream=false", fii_request())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Análise pronta.");
}

#[tokio::test]
async fn test_validation_error_is_400_without_side_effects() {
    let app = default_app(MockModel::new());
    let mut request = fii_request();
    request["ativo"] = serde_json::Value::Null;

    let (status, content_type, body) = send(app.router, post("/api/analysis", request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "text/plain; charset=utf-8");
    assert_eq!(body, "Informe o ativo.");
    assert_eq!(app.source.call_count(), 0);
    assert_eq!(app.model.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = default_app(MockModel::new());
    let request = Request::builder()
        .method("POST")
        .uri("/api/analysis")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, _) = send(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_model_key_is_500() {
    let app = app_with(MockPageSource::new(), None, FetchFailurePolicy::Abort);

    let (status, _, body) = send(app.router, post("/api/analysis", fii_request())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "GEMINI_API_KEY não configurada.");
}

#[tokio::test]
async fn test_unknown_ticker_aborts_with_422() {
    let app = app_with(MockPageSource::new(), Some(MockModel::new()), FetchFailurePolicy::Abort);

    let (status, _, body) = send(app.router, post("/api/analysis", fii_request())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Confirme o ticker"));
    assert_eq!(app.model.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_ticker_degrades_to_not_available() {
    let app = app_with(
        MockPageSource::new(),
        Some(MockModel::new().with_response("ok")),
        FetchFailurePolicy::Degrade,
    );

    let (status, _, _) = send(app.router, post("/api/analysis", fii_request())).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.model.last_prompt().unwrap().contains("N/D"));
}

#[tokio::test]
async fn test_portfolio_skips_fetch() {
    let app = default_app(MockModel::new().with_response("Carteira sugerida"));
    let request = serde_json::json!({
        "investmentType": "montar_carteira",
        "investorProfile": "conservador",
        "analysisDate": "2025-01-10"
    });

    let (status, _, body) = send(app.router, post("/api/analysis", request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Carteira sugerida");
    assert_eq!(app.source.call_count(), 0);
    assert!(app.model.last_prompt().unwrap().contains("carteira balanceada"));
}

#[tokio::test]
async fn test_model_failure_is_502() {
    let app = default_app(MockModel::new().with_failure("quota exceeded"));

    let (status, _, body) = send(app.router, post("/api/analysis?stream=false", fii_request())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.contains("quota"));
}

#[tokio::test(start_paused = true)]
async fn test_model_timeout_before_first_byte_is_504() {
    let app = default_app(MockModel::new().with_delay(Duration::from_secs(120)));

    let (status, _, _) = send(app.router, post("/api/analysis", fii_request())).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_model_timeout_mid_stream_ends_with_notice() {
    let model = MockModel::new().with_chunks(vec![
        MockChunk::Text("Começo da análise".into()),
        MockChunk::Pause(Duration::from_secs(120)),
        MockChunk::Text("nunca chega".into()),
    ]);
    let app = default_app(model);

    let (status, _, body) = send(app.router, post("/api/analysis", fii_request())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("Começo da análise{}", STREAM_TIMEOUT_NOTICE));
}

#[tokio::test]
async fn test_discovered_profile_and_unavailable_type_reach_prompt() {
    let app = default_app(MockModel::new().with_response("ok"));
    let request = serde_json::json!({
        "tipoInvestimento": "fii",
        "tipoAnalise": "dividendos",
        "ativo": "hglg",
        "perfilInvestidor": "descobrir",
        "respostasPerfil": [3, 3, 3, 2, 3],
        "dataAnalise": "2025-01-10"
    });

    let (status, _, _) = send(app.router, post("/api/analysis", request)).await;

    assert_eq!(status, StatusCode::OK);
    let prompt = app.model.last_prompt().unwrap();
    assert!(prompt.contains("Perfil: agressivo."));
    assert!(prompt.contains("análise completa"));
    assert!(!prompt.contains("análise focada em dividendos"));
}

#[tokio::test]
async fn test_incomplete_profile_quiz_is_400() {
    let app = default_app(MockModel::new());
    let mut request = fii_request();
    request["perfilInvestidor"] = "descobrir".into();
    request["respostasPerfil"] = serde_json::json!([1, 2]);

    let (status, _, body) = send(app.router, post("/api/analysis", request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Responda as 5 perguntas do perfil com valores de 1 a 3.");
    assert_eq!(app.model.call_count(), 0);
}
