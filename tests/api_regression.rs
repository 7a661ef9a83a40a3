//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;
use well_schematic::api::{create_app, ApiState};
use well_schematic::OrchestratorConfig;

fn test_state(tmp: &TempDir) -> ApiState {
    let mut config = OrchestratorConfig::for_workspace(tmp.path());
    config.settle.poll_interval_ms = 50;
    config.settle.max_wait_ms = 2_000;
    ApiState::new(config)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn archive_fixture(tmp: &TempDir) {
    let dir = tmp.path().join("2026-05-01_08-30-00");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("well_structure_plot.png"), b"\x89PNG").unwrap();
    fs::write(dir.join("well_structure_report.md"), "# Well report\n").unwrap();
    fs::create_dir(tmp.path().join("2026-04-30_23-59-59")).unwrap();
}

#[tokio::test]
async fn health_returns_ok() {
    let tmp = TempDir::new().unwrap();
    let resp = create_app(test_state(&tmp)).oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn invalid_well_data_is_400_with_validation_code() {
    let tmp = TempDir::new().unwrap();
    let app = create_app(test_state(&tmp));

    let resp = app
        .oneshot(post_json(
            "/api/v1/well-structure",
            &json!({ "well_data": { "wellName": "X" }, "output_format": "path" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["error_code"], "VALIDATION_ERROR");
    assert!(v["details"].as_str().unwrap().contains("totalDepth_m"));
}

#[tokio::test]
async fn missing_generator_is_500_with_generator_code() {
    let tmp = TempDir::new().unwrap();
    let app = create_app(test_state(&tmp));

    let resp = app
        .oneshot(post_json(
            "/api/v1/well-structure",
            &json!({
                "well_data": {
                    "wellName": "Z-2",
                    "totalDepth_m": 2100.5,
                    "wellType": "straight well",
                    "stratigraphy": [],
                    "drillingFluidAndPressure": [],
                    "wellboreStructure": {}
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = body_json(resp).await;
    assert_eq!(v["error_code"], "GENERATOR_ERROR");
    assert_eq!(v["failure_kind"], "missing_binary");
}

#[tokio::test]
async fn malformed_request_body_is_validation_result() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    for body in [
        json!({ "well_data": {}, "output_format": "svg" }),
        json!({ "output_format": "path" }),
    ] {
        let resp = create_app(state.clone())
            .oneshot(post_json("/api/v1/well-structure", &body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        let v = body_json(resp).await;
        assert_eq!(v["success"], false);
        assert_eq!(v["error_code"], "VALIDATION_ERROR");
        assert!(v["details"].is_string());
    }

    let resp = create_app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/well-structure")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["error_code"], "VALIDATION_ERROR");
}

#[cfg(unix)]
#[tokio::test]
async fn abandoned_request_still_archives() {
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let script = state.config.generator_path();
    fs::write(
        &script,
        "#!/bin/sh\nsleep 1\nprintf 'PNG' > well_structure_plot.png\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let request = post_json(
        "/api/v1/well-structure",
        &json!({
            "well_data": {
                "wellName": "D-1",
                "totalDepth_m": 1800,
                "wellType": "straight well",
                "stratigraphy": [],
                "drillingFluidAndPressure": [],
                "wellboreStructure": {}
            },
            "output_format": "path"
        }),
    );
    let early = tokio::time::timeout(
        Duration::from_millis(300),
        create_app(state.clone()).oneshot(request),
    )
    .await;
    assert!(early.is_err(), "request should still be in flight");

    let mut archives = json!([]);
    for _ in 0..100 {
        let resp = create_app(state.clone())
            .oneshot(get("/api/v1/archives"))
            .await
            .unwrap();
        archives = body_json(resp).await["data"]["archives"].clone();
        if archives.as_array().is_some_and(|a| !a.is_empty()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(archives.as_array().map(Vec::len), Some(1));
}

#[cfg(unix)]
#[tokio::test]
async fn generate_then_retrieve_archive() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let script = state.config.generator_path();
    fs::write(
        &script,
        "#!/bin/sh\nprintf 'PNG' > well_structure_plot.png\nprintf '# ok\\n' > well_structure_report.md\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let resp = create_app(state.clone())
        .oneshot(post_json(
            "/api/v1/well-structure",
            &json!({
                "well_data": {
                    "wellName": "H-7",
                    "totalDepth_m": 3500,
                    "wellType": "horizontal well",
                    "stratigraphy": [],
                    "drillingFluidAndPressure": [],
                    "wellboreStructure": {}
                },
                "output_format": "base64"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["image_base64"], "UE5H");
    let folder = v["archive_folder"].as_str().unwrap().to_string();

    let resp = create_app(state.clone())
        .oneshot(get("/api/v1/archives"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"]["archives"][0], folder.as_str());

    let resp = create_app(state.clone())
        .oneshot(get(&format!("/api/v1/archives/{folder}/report")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"# ok\n");
}

#[tokio::test]
async fn archives_listed_newest_first() {
    let tmp = TempDir::new().unwrap();
    archive_fixture(&tmp);

    let resp = create_app(test_state(&tmp))
        .oneshot(get("/api/v1/archives"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(
        v["data"]["archives"],
        json!(["2026-05-01_08-30-00", "2026-04-30_23-59-59"])
    );
}

#[tokio::test]
async fn archive_detail_image_and_report() {
    let tmp = TempDir::new().unwrap();
    archive_fixture(&tmp);
    let state = test_state(&tmp);

    let resp = create_app(state.clone())
        .oneshot(get("/api/v1/archives/2026-05-01_08-30-00"))
        .await
        .unwrap();
    assert_eq!(
        body_json(resp).await["data"]["files"],
        json!(["well_structure_plot.png", "well_structure_report.md"])
    );

    let resp = create_app(state.clone())
        .oneshot(get("/api/v1/archives/2026-05-01_08-30-00/image"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");

    let resp = create_app(state)
        .oneshot(get("/api/v1/archives/2026-05-01_08-30-00/report"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/markdown"));
}

#[tokio::test]
async fn archive_lookup_errors() {
    let tmp = TempDir::new().unwrap();
    archive_fixture(&tmp);
    let state = test_state(&tmp);

    let resp = create_app(state.clone())
        .oneshot(get("/api/v1/archives/2020-01-01_00-00-00"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = create_app(state.clone())
        .oneshot(get("/api/v1/archives/not-an-archive"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = create_app(state)
        .oneshot(get("/api/v1/archives/2026-04-30_23-59-59/image"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"]["code"], "NOT_FOUND");
}
