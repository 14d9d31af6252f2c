use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use ledger_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};

use crate::HttpState;

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let app_state = AppState::new(AppConfig::new(
        paths.db_path,
        temp_dir.path().join("usage-ledger.jsonl"),
    ));
    app_state.setup_db().expect("setup db");

    let app = crate::router(HttpState::new(app_state));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/nowhere")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("application/json"));
}
