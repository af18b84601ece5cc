mod common;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use common::{dir_entries, test_config, unreachable_base_url, HitCounter, ReleaseHost};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use yst_installer::download::Downloader;
use yst_installer::errors::InstallError;
use yst_installer::retry::RecordingSleeper;

const PAYLOAD: &[u8] = b"\x7fELF fake yst_mcp binary payload";

fn downloader(base_url: &str, root: &TempDir, sleeper: &RecordingSleeper) -> Downloader {
    let config = test_config(base_url, root.path());
    Downloader::new(&config, Arc::new(sleeper.clone()))
        .unwrap()
        .with_progress(false)
}

fn redirect_to(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

#[tokio::test]
async fn test_follows_redirect_chain() {
    let router = Router::new()
        // relative Location, resolved against the current URL
        .route("/releases/start", get(|| async { redirect_to("hop".to_string()) }))
        // absolute Location
        .route(
            "/releases/hop",
            get(|headers: HeaderMap| async move {
                let host = headers
                    .get(header::HOST)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                redirect_to(format!("http://{host}/assets/yst_mcp_linux_amd64"))
            }),
        )
        .route("/assets/yst_mcp_linux_amd64", get(|| async { PAYLOAD }));
    let host = ReleaseHost::launch(router).await.unwrap();

    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");

    let bytes = downloader(&host.base_url(), &root, &sleeper)
        .download(&host.url("/releases/start"), &dest)
        .await
        .unwrap();

    assert_eq!(bytes, PAYLOAD.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
    assert_eq!(dir_entries(root.path()), vec!["yst_mcp".to_string()]);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_redirect_loop_is_capped() {
    let hits = HitCounter::default();
    let router = Router::new()
        .route(
            "/loop",
            get(|State(hits): State<HitCounter>| async move {
                hits.hit();
                redirect_to("/loop".to_string())
            }),
        )
        .with_state(hits.clone());
    let host = ReleaseHost::launch(router).await.unwrap();
    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");

    let err = downloader(&host.base_url(), &root, &sleeper)
        .download(&host.url("/loop"), &dest)
        .await
        .unwrap_err();

    assert!(
        matches!(err, InstallError::TooManyRedirects { limit: 5, .. }),
        "got {err:?}"
    );
    assert_eq!(hits.count(), 6);
    assert!(dir_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_timeouts_then_success() {
    let hits = HitCounter::default();
    let router = Router::new()
        .route(
            "/asset",
            get(|State(hits): State<HitCounter>| async move {
                if hits.hit() < 2 {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                PAYLOAD
            }),
        )
        .with_state(hits.clone());
    let host = ReleaseHost::launch(router).await.unwrap();
    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");

    downloader(&host.base_url(), &root, &sleeper)
        .download(&host.url("/asset"), &dest)
        .await
        .unwrap();

    assert_eq!(hits.count(), 3);
    assert_eq!(sleeper.count(), 2);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
    assert_eq!(dir_entries(root.path()), vec!["yst_mcp".to_string()]);
}

#[tokio::test]
async fn test_stalled_body_leaves_no_partial_file() {
    let hits = HitCounter::default();
    let router = Router::new()
        .route(
            "/asset",
            get(|State(hits): State<HitCounter>| async move {
                hits.hit();
                let first = stream::once(async { Ok(Bytes::from_static(PAYLOAD)) });
                let stalled = stream::pending::<Result<Bytes, std::io::Error>>();
                Body::from_stream(first.chain(stalled))
            }),
        )
        .with_state(hits.clone());
    let host = ReleaseHost::launch(router).await.unwrap();
    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");

    let err = downloader(&host.base_url(), &root, &sleeper)
        .download(&host.url("/asset"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::Timeout { .. }), "got {err:?}");
    assert_eq!(hits.count(), 4);
    assert_eq!(sleeper.count(), 3);
    assert!(!dest.exists());
    assert!(dir_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_not_found_fails_without_retry() {
    let hits = HitCounter::default();
    let router = Router::new()
        .route(
            "/asset",
            get(|State(hits): State<HitCounter>| async move {
                hits.hit();
                StatusCode::NOT_FOUND
            }),
        )
        .with_state(hits.clone());
    let host = ReleaseHost::launch(router).await.unwrap();
    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");

    let err = downloader(&host.base_url(), &root, &sleeper)
        .download(&host.url("/asset"), &dest)
        .await
        .unwrap_err();

    match &err {
        InstallError::HttpStatus { url, status } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(url.path(), "/asset");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(hits.count(), 1);
    assert_eq!(sleeper.count(), 0);
    assert!(dir_entries(root.path()).is_empty());
}

#[tokio::test]
async fn test_overwrites_existing_file() {
    let router = Router::new().route("/asset", get(|| async { PAYLOAD }));
    let host = ReleaseHost::launch(router).await.unwrap();
    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");
    std::fs::write(&dest, vec![0u8; PAYLOAD.len() * 4]).unwrap();

    downloader(&host.base_url(), &root, &sleeper)
        .download(&host.url("/asset"), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[tokio::test]
async fn test_connection_refused_exhausts_budget() {
    let base_url = unreachable_base_url().await;
    let root = TempDir::new().unwrap();
    let sleeper = RecordingSleeper::new();
    let dest = root.path().join("yst_mcp");
    let url = url::Url::parse(&format!("{base_url}/asset")).unwrap();

    let err = downloader(&base_url, &root, &sleeper)
        .download(&url, &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::Transport { .. }), "got {err:?}");
    assert_eq!(sleeper.count(), 3);
    assert!(dir_entries(root.path()).is_empty());
}
