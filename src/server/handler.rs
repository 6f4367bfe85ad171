// Axum handlers — expose the current download statistics as JSON.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::catalog::{self, PackageDescriptor};
use crate::engine::poller::{DisplayState, StatsPoller};
use crate::engine::stats::StatsSnapshot;

pub struct StatsServer {
    addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl StatsServer {
    /// Bind `addr` (use port 0 for a random port) and serve in the background.
    pub async fn start(poller: Arc<StatsPoller>, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = router(poller);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });
        info!("stats server listening on {}", addr);

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Reachable URL for `path`; a wildcard bind address maps to loopback.
    pub fn url(&self, path: &str) -> String {
        let ip = match self.addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        format!("http://{}{}", SocketAddr::new(ip, self.addr.port()), path)
    }

    /// Shutdown the server gracefully.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub fn router(poller: Arc<StatsPoller>) -> Router {
    Router::new()
        .route("/api/downloads", get(downloads_handler))
        .route("/api/packages", get(packages_handler))
        .route("/api/packages/{name}", get(package_handler))
        .route("/api/poller", get(poller_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(poller)
}

#[derive(Debug, Serialize)]
struct DownloadsBody {
    display: String,
    total: u64,
    per_package: std::collections::BTreeMap<String, u64>,
    failed: Vec<String>,
    cycle: u64,
    refreshed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<DisplayState> for DownloadsBody {
    fn from(state: DisplayState) -> Self {
        Self {
            display: state.display,
            total: state.report.total,
            per_package: state.report.per_package,
            failed: state.report.failed,
            cycle: state.cycle,
            refreshed_at: state.refreshed_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct PackageBody {
    name: String,
    registry_id: String,
    title: String,
    subtitle: String,
    install: String,
    /// `None` until a cycle has counted the package.
    downloads: Option<u64>,
    failed: bool,
}

fn package_body(pkg: &PackageDescriptor, state: &DisplayState) -> PackageBody {
    PackageBody {
        name: pkg.name.clone(),
        registry_id: pkg.registry_id.clone(),
        title: pkg.title.clone(),
        subtitle: pkg.subtitle.clone(),
        install: pkg.install_command(),
        downloads: state.report.count_for(&pkg.registry_id),
        failed: state.report.failed.contains(&pkg.registry_id),
    }
}

/// GET /api/downloads — aggregate total and per-package counts.
async fn downloads_handler(State(poller): State<Arc<StatsPoller>>) -> Json<DownloadsBody> {
    Json(poller.snapshot().into())
}

/// GET /api/packages — catalog in display order, with the latest counts.
async fn packages_handler(State(poller): State<Arc<StatsPoller>>) -> Json<Vec<PackageBody>> {
    let state = poller.snapshot();
    Json(
        poller
            .packages()
            .iter()
            .map(|pkg| package_body(pkg, &state))
            .collect(),
    )
}

/// GET /api/packages/{name} — one package by short name or URL-encoded registry id.
async fn package_handler(
    State(poller): State<Arc<StatsPoller>>,
    Path(name): Path<String>,
) -> Response {
    debug!("package request name={}", name);
    match catalog::find(poller.packages(), &name) {
        Some(pkg) => Json(package_body(pkg, &poller.snapshot())).into_response(),
        None => (StatusCode::NOT_FOUND, "package not found").into_response(),
    }
}

/// GET /api/poller — refresh counters.
async fn poller_handler(State(poller): State<Arc<StatsPoller>>) -> Json<StatsSnapshot> {
    Json(poller.stats())
}
