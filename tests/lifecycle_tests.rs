// tests/lifecycle_tests.rs

use assert_matches::assert_matches;
use dnsreroute::serve::{bind, serve_until_shutdown};
use dnsreroute::{AdminServer, AppError};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

#[tokio::test]
async fn test_server_stops_after_shutdown_request() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let result = Toplevel::new(move |s| async move {
        s.start(SubsystemBuilder::new("admin", move |s| async move {
            serve_until_shutdown("admin", listener, AdminServer::create_router(), &s).await
        }));
        s.start(SubsystemBuilder::new("client", move |s| async move {
            let response = reqwest::get(format!("http://{}/health", addr))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            s.request_shutdown();
            Ok::<(), AppError>(())
        }));
    })
    .handle_shutdown_requests(Duration::from_secs(5))
    .await;

    assert!(result.is_ok(), "{:?}", result.err());

    // 服务返回后监听器已释放
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_bind_reports_address_in_use() {
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = occupied.local_addr().unwrap();

    let result = bind("proxy", addr).await;
    assert_matches!(result, Err(AppError::Io(_)));
}
