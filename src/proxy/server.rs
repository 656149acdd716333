// src/proxy/server.rs

use crate::error::AppError;
use crate::forwarder::Forwarder;
use crate::proxy::handlers::handle_proxy;
use crate::proxy::state::AppState;
use crate::r#const::subsystem_names;
use crate::serve::{bind, serve_until_shutdown};
use axum::{routing::any, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::info;

/// DoH 转发代理服务器
pub struct ProxyServer {
    bind_addr: SocketAddr,
    /// 对外暴露的路由路径，其他路径返回 404
    path: String,
    forwarder: Arc<Forwarder>,
}

impl ProxyServer {
    pub fn new(bind_addr: SocketAddr, path: impl Into<String>, forwarder: Arc<Forwarder>) -> Self {
        Self {
            bind_addr,
            path: path.into(),
            forwarder,
        }
    }

    /// 作为优雅关闭子系统运行
    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), AppError> {
        let listener = bind(subsystem_names::PROXY_SERVER, self.bind_addr).await?;
        info!(
            route = %self.path,
            upstream = %self.forwarder.upstream(),
            max_body_size = self.forwarder.max_body_size(),
            "Proxy server listening on {}",
            self.bind_addr
        );

        let router = create_router(&self.path, self.forwarder);
        serve_until_shutdown(subsystem_names::PROXY_SERVER, listener, router, &subsys).await
    }
}

/// 创建代理路由，所有方法都交给同一个处理函数
pub fn create_router(path: &str, forwarder: Arc<Forwarder>) -> Router {
    Router::new()
        .route(path, any(handle_proxy))
        .with_state(AppState { forwarder })
}
