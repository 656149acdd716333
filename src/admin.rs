// src/admin.rs

use crate::error::AppError;
use crate::metrics;
use crate::r#const::subsystem_names;
use crate::serve::{bind, serve_until_shutdown};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::info;

/// 管理端点：`/health` 和 `/metrics`
pub struct AdminServer {
    listen_addr: SocketAddr,
}

impl AdminServer {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self { listen_addr }
    }

    pub fn create_router() -> Router {
        Router::new()
            .route("/health", get(|| async { "OK" }))
            .merge(metrics::metrics_routes())
    }

    /// 作为优雅关闭子系统运行
    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), AppError> {
        let listener = bind(subsystem_names::ADMIN_SERVER, self.listen_addr).await?;
        info!("Admin server listening on {}", self.listen_addr);

        serve_until_shutdown(
            subsystem_names::ADMIN_SERVER,
            listener,
            Self::create_router(),
            &subsys,
        )
        .await
    }
}
