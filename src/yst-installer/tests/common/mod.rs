#![allow(dead_code)]

use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;
use yst_installer::config::InstallerConfig;

pub const LATEST_PATH: &str = "/repos/Xuzan9396/yst_mcp/releases/latest";

pub fn asset_path(version: &str, asset: &str) -> String {
    format!("/Xuzan9396/yst_mcp/releases/download/{version}/{asset}")
}

/// Stand-in for the release host, bound to an OS-assigned local port.
pub struct ReleaseHost {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ReleaseHost {
    pub async fn launch(router: Router) -> anyhow::Result<Self> {
        // 0: means port will be picked by the OS
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { addr, handle })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("{}{path}", self.base_url())).unwrap()
    }
}

impl Drop for ReleaseHost {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A base URL on which nothing is listening.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[derive(Clone, Default)]
pub struct HitCounter(Arc<AtomicUsize>);

impl HitCounter {
    /// Records a hit and returns how many came before it.
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Points both endpoints at `base_url` with short timeouts, installing under `root`.
pub fn test_config(base_url: &str, root: &Path) -> InstallerConfig {
    InstallerConfig {
        api_base: base_url.to_string(),
        download_base: base_url.to_string(),
        metadata_timeout_ms: 500,
        download_timeout_ms: 500,
        max_retries: 3,
        retry_delay_ms: 10,
        install_root: Some(root.to_path_buf()),
        ..InstallerConfig::default()
    }
}

/// Lists the file names in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
