//! End-to-end tests: HTTP surface + inference client + catalog against a
//! mock upstream.

use std::io::Write;
use std::net::SocketAddr;

use cropsight::catalog::DiseaseCatalog;
use cropsight::config::AppConfig;
use cropsight::http::HttpServer;
use cropsight::inference::InferenceClient;
use cropsight::lifecycle::Shutdown;

mod common;
use common::{start_mock_service, unreachable_base_url, MockReply};

const CATALOG_JSON: &str = r#"{
    "Apple": {
        "Apple___Apple_scab": {
            "treatment": ["Apply captan fungicide"],
            "prevention": ["Remove fallen leaves"],
            "organic_methods": ["Sulfur spray"]
        }
    }
}"#;

/// Boot a server against the given upstream; returns its address and the
/// shutdown handle keeping it alive.
async fn start_server(upstream_base_url: String) -> (SocketAddr, Shutdown) {
    let mut catalog_file = tempfile::NamedTempFile::new().unwrap();
    catalog_file.write_all(CATALOG_JSON.as_bytes()).unwrap();

    let mut config = AppConfig::default();
    config.inference.base_url = upstream_base_url;
    config.inference.base_backoff_ms = 50;
    config.inference.normal_timeout_ms = 2_000;
    config.inference.cold_start_timeout_ms = 4_000;
    config.catalog.data_path = catalog_file.path().to_path_buf();

    let catalog = DiseaseCatalog::load(&config.catalog.data_path).unwrap();
    let inference = InferenceClient::new(&config.inference).unwrap();
    let server = HttpServer::new(&config, inference, catalog);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

fn image_form(crop: Option<&str>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(vec![0xff, 0xd8, 0xff, 0xe0])
        .file_name("leaf.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("image", part);
    match crop {
        Some(c) => form.text("crop", c.to_string()),
        None => form,
    }
}

#[tokio::test]
async fn test_analyze_merges_catalog_guidance() {
    let mock = start_mock_service(|_| async {
        MockReply::json(
            200,
            r#"{"success":true,"disease":"Apple___Apple_scab","confidence":91.4}"#,
        )
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/api/crop/analyze"))
        .multipart(image_form(Some("Apple")))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["crop"], "Apple");
    assert_eq!(body["disease"], "Apple___Apple_scab");
    assert_eq!(body["confidence"], 91.4);
    assert_eq!(body["treatment"][0], "Apply captan fungicide");
    assert_eq!(body["organic_methods"][0], "Sulfur spray");
}

#[tokio::test]
async fn test_analyze_unknown_disease_gets_fallback_guidance() {
    let mock = start_mock_service(|_| async {
        MockReply::json(
            200,
            r#"{"success":true,"disease":"Tomato___Late_blight","confidence":64.0}"#,
        )
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/api/crop/analyze"))
        .multipart(image_form(Some("Tomato")))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["treatment"][0], "Consult local agricultural expert");
}

#[tokio::test]
async fn test_analyze_missing_crop_is_rejected_before_upstream() {
    let mock = start_mock_service(|_| async {
        MockReply::json(200, r#"{"success":true,"disease":"x","confidence":1.0}"#)
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/api/crop/analyze"))
        .multipart(image_form(None))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Crop name is required");
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_analyze_missing_image_is_rejected_before_upstream() {
    let mock = start_mock_service(|_| async {
        MockReply::json(200, r#"{"success":true,"disease":"x","confidence":1.0}"#)
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let form = reqwest::multipart::Form::new().text("crop", "Apple");
    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/api/crop/analyze"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Image is required");
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_analyze_upstream_failure_maps_to_bad_gateway() {
    let mock = start_mock_service(|_| async {
        MockReply::json(503, r#"{"error":"Service Unavailable"}"#)
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/api/crop/analyze"))
        .multipart(image_form(Some("Apple")))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Disease detection failed");
    assert_eq!(body["kind"], "server_error");
    assert_eq!(body["status_code"], 503);
    assert_eq!(mock.calls(), 3, "all retry attempts spent before giving up");
}

#[tokio::test]
async fn test_health_endpoint_reports_model_state() {
    let mock = start_mock_service(|_| async {
        MockReply::json(200, r#"{"status":"healthy","model_loaded":true}"#)
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let res = reqwest::get(format!("http://{addr}/api/crop/health"))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_health_endpoint_never_errors_when_upstream_is_down() {
    let (addr, _shutdown) = start_server(unreachable_base_url().await).await;

    let res = reqwest::get(format!("http://{addr}/api/crop/health"))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_crops_endpoint_falls_back_to_empty_list() {
    let (addr, _shutdown) = start_server(unreachable_base_url().await).await;

    let res = reqwest::get(format!("http://{addr}/api/crop/crops"))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["crops"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_crops_endpoint_proxies_upstream_list() {
    let mock = start_mock_service(|_| async {
        MockReply::json(200, r#"{"success":true,"crops":["Apple","Tomato"],"count":2}"#)
    })
    .await;
    let (addr, _shutdown) = start_server(mock.base_url()).await;

    let res = reqwest::get(format!("http://{addr}/api/crop/crops"))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["crops"][0], "Apple");
}
