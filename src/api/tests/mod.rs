use super::*;
use crate::storage::test_helpers::{DownloadBehavior, MockBlob};
use crate::test_helpers::{TestService, create_test_service};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tempfile::tempdir;
use tower::ServiceExt;

const TRIGGER: &str = "/api/lecture-video-download-fn";

fn router(test: &TestService) -> Router {
    create_router(test.service.clone(), Arc::new(Config::default()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_missing_file_parameter_is_bad_request() {
    let test = create_test_service(vec![], Some("/tmp"));

    let (status, body) = get(router(&test), TRIGGER).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing file name");

    let (status, body) = get(router(&test), &format!("{}?file=", TRIGGER)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing file name");
}

#[tokio::test]
async fn test_blob_not_found_returns_404() {
    let dir = tempdir().unwrap();
    let test = create_test_service(
        vec![MockBlob::new("test_lecture").missing()],
        Some(dir.path().to_str().unwrap()),
    );

    let (status, body) = get(router(&test), &format!("{}?file=test_lecture", TRIGGER)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        format!(
            "'test_lecture' not found @ '{}'",
            crate::storage::test_helpers::MockContainer::URI
        )
    );

    test.service.scheduler().wait_idle().await;
    assert_eq!(test.downloads("test_lecture"), 0);
}

#[tokio::test]
async fn test_existing_blob_returns_ok_and_downloads() {
    let dir = tempdir().unwrap();
    let test = create_test_service(
        vec![MockBlob::new("test_lecture")],
        Some(dir.path().to_str().unwrap()),
    );

    let (status, body) = get(router(&test), &format!("{}?file=test_lecture", TRIGGER)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "File download started");

    test.service.scheduler().wait_idle().await;
    assert_eq!(test.downloads("test_lecture"), 1);
    assert!(dir.path().join("test_lecture").exists());
}

#[tokio::test]
async fn test_response_does_not_wait_for_transfer() {
    let dir = tempdir().unwrap();
    let gate = Arc::new(tokio::sync::Semaphore::new(0));
    let test = create_test_service(
        vec![MockBlob::new("slow.mp4").gated(gate.clone())],
        Some(dir.path().to_str().unwrap()),
    );

    // The transfer is blocked on the gate, yet the request completes
    let (status, _) = tokio::time::timeout(
        Duration::from_secs(5),
        get(router(&test), &format!("{}?file=slow.mp4", TRIGGER)),
    )
    .await
    .expect("request should not wait for the transfer");
    assert_eq!(status, StatusCode::OK);
    assert!(!dir.path().join("slow.mp4").exists());

    gate.add_permits(1);
    test.service.scheduler().wait_idle().await;
    assert!(dir.path().join("slow.mp4").exists());
}

#[tokio::test]
async fn test_folder_unset_still_returns_ok() {
    let test = create_test_service(vec![MockBlob::new("test_lecture")], None);

    let (status, body) = get(router(&test), &format!("{}?file=test_lecture", TRIGGER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "File download started");

    test.service.scheduler().wait_idle().await;
    assert_eq!(test.downloads("test_lecture"), 0);
}

#[tokio::test]
async fn test_existing_target_returns_ok_without_download() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("test_lecture"), b"old").unwrap();
    let test = create_test_service(
        vec![MockBlob::new("test_lecture")],
        Some(dir.path().to_str().unwrap()),
    );

    let (status, _) = get(router(&test), &format!("{}?file=test_lecture", TRIGGER)).await;
    assert_eq!(status, StatusCode::OK);

    test.service.scheduler().wait_idle().await;
    assert_eq!(test.downloads("test_lecture"), 0);
    assert_eq!(std::fs::read(dir.path().join("test_lecture")).unwrap(), b"old");
}

#[tokio::test]
async fn test_failed_transfer_still_reports_ok() {
    let dir = tempdir().unwrap();
    let test = create_test_service(
        vec![
            MockBlob::new("broken.mp4").behavior(DownloadBehavior::Fail {
                partial: vec![],
                message: "connection reset".into(),
            }),
            MockBlob::new("fine.mp4"),
        ],
        Some(dir.path().to_str().unwrap()),
    );

    let (status, _) = get(router(&test), &format!("{}?file=broken.mp4", TRIGGER)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(router(&test), &format!("{}?file=fine.mp4", TRIGGER)).await;
    assert_eq!(status, StatusCode::OK);

    test.service.scheduler().wait_idle().await;
    assert!(dir.path().join("fine.mp4").exists());
}

#[tokio::test]
async fn test_url_encoded_file_name() {
    let dir = tempdir().unwrap();
    let test = create_test_service(
        vec![MockBlob::new("lecture 1.mp4")],
        Some(dir.path().to_str().unwrap()),
    );

    let (status, _) = get(router(&test), &format!("{}?file=lecture%201.mp4", TRIGGER)).await;
    assert_eq!(status, StatusCode::OK);

    test.service.scheduler().wait_idle().await;
    assert!(dir.path().join("lecture 1.mp4").exists());
}

#[tokio::test]
async fn test_post_is_not_allowed() {
    let test = create_test_service(vec![], None);

    let response = router(&test)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{}?file=a", TRIGGER))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_custom_function_name_route() {
    let test = create_test_service(vec![MockBlob::new("a.mp4")], None);
    let config = Config {
        function_name: "video-fetch".to_string(),
        ..Default::default()
    };
    let app = create_router(test.service.clone(), Arc::new(config));

    let (status, _) = get(app.clone(), "/api/video-fetch?file=a.mp4").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(app, &format!("{}?file=a.mp4", TRIGGER)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let test = create_test_service(vec![], None);

    let (status, body) = get(router(&test), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"));
    assert!(body.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let test = create_test_service(vec![], None);

    let (status, body) = get(router(&test), "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("lecture-video-download-fn"));
}

#[tokio::test]
async fn test_openapi_lists_custom_trigger_route() {
    let test = create_test_service(vec![], None);
    let config = Config {
        function_name: "video-fetch".to_string(),
        ..Config::default()
    };
    let app = create_router(test.service.clone(), Arc::new(config));

    let (status, body) = get(app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/video-fetch"));
    assert!(!body.contains("lecture-video-download-fn"));
}

#[tokio::test]
async fn test_swagger_ui_enabled() {
    let test = create_test_service(vec![], None);
    let mut config = Config::default();
    config.server.swagger_ui = true;
    let app = create_router(test.service.clone(), Arc::new(config));

    let (status, body) = get(app.clone(), "/swagger-ui/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<html") || body.contains("<!DOCTYPE html>"));

    let (status, body) = get(app.clone(), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("lecture-video-download-fn"));

    // The standalone document route stays available next to Swagger UI
    let (status, _) = get(app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_disabled_by_default() {
    let test = create_test_service(vec![], None);

    let (status, _) = get(router(&test), "/swagger-ui/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_relative_segments_are_bad_request() {
    let dir = tempdir().unwrap();
    let test = create_test_service(
        vec![MockBlob::new("lec1.mp4")],
        Some(dir.path().to_str().unwrap()),
    );

    let (status, body) = get(router(&test), &format!("{}?file=..%2F..%2Flec1.mp4", TRIGGER)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid file name"));
    assert!(test.connector.configs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cors_enabled() {
    let test = create_test_service(vec![], None);
    let mut config = Config::default();
    config.server.cors_enabled = true;
    config.server.cors_origins = vec!["*".to_string()];
    let app = create_router(test.service.clone(), Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled_by_default() {
    let test = create_test_service(vec![], None);

    let response = router(&test)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_api_server_serves_and_shuts_down() {
    let test = create_test_service(vec![MockBlob::new("a.mp4")], None);
    let mut config = Config::default();
    // Grab a free port, then release it for the server
    let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    config.server.bind_address = reserved.local_addr().unwrap();
    drop(reserved);
    let address = config.server.bind_address;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server(
        test.service.clone(),
        Arc::new(config),
        async move {
            let _ = stop_rx.await;
        },
    ));

    // Wait for the listener to come up
    let mut stream = None;
    for _ in 0..50 {
        if let Ok(s) = tokio::net::TcpStream::connect(address).await {
            stream = Some(s);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let mut stream = stream.expect("server should accept connections");

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream
        .write_all(
            format!(
                "GET {}?file=a.mp4 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                TRIGGER
            )
            .as_bytes(),
        )
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("File download started"));

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
