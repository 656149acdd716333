// src/serve.rs

use crate::error::AppError;
use axum::Router;
use std::future::IntoFuture;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::{error, info};

/// 在已绑定的监听器上提供服务，直到子系统收到关闭请求
///
/// 收到关闭请求后停止接受新连接，并等待进行中的请求完成后再返回，
/// 整体耗时受 `Toplevel` 的关闭超时约束。
pub async fn serve_until_shutdown(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    subsys: &SubsystemHandle,
) -> Result<(), AppError> {
    let (drain_tx, drain_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = drain_rx.await;
        })
        .into_future();
    let mut server = std::pin::pin!(server);

    let result = tokio::select! {
        result = &mut server => result,
        _ = subsys.on_shutdown_requested() => {
            info!("{} draining in-flight requests", name);
            let _ = drain_tx.send(());
            server.await
        }
    };

    match result {
        Ok(()) => {
            info!("{} stopped", name);
            Ok(())
        }
        Err(e) => {
            error!("{} failed: {}", name, e);
            Err(AppError::Io(e))
        }
    }
}

/// 绑定监听地址，失败时带上服务名记录日志
pub async fn bind(name: &'static str, addr: std::net::SocketAddr) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr).await.map_err(|e| {
        error!("{} failed to bind {}: {}", name, addr, e);
        AppError::Io(e)
    })
}
