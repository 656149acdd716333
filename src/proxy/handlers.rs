// src/proxy/handlers.rs

use crate::forwarder::InboundRequest;
use crate::metrics::METRICS;
use crate::proxy::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::debug;

// 不允许的方法统一归为一个标签
const OTHER_METHOD_LABEL: &str = "OTHER";

/// 处理代理路由上的所有请求
///
/// 方法检查、预检和转发都交给 Forwarder，这里只负责记录指标
pub async fn handle_proxy(State(state): State<AppState>, request: Request<Body>) -> Response {
    // 记录请求开始时间
    let start_time = Instant::now();
    let method = request.method().clone();

    let response = state
        .forwarder
        .handle(InboundRequest::from(request))
        .await;

    // 记录处理时间
    let duration = start_time.elapsed();
    let method_label = method_label(&method);
    METRICS
        .requests_total()
        .with_label_values(&[method_label, response.status.as_str()])
        .inc();
    METRICS
        .request_duration_seconds()
        .with_label_values(&[method_label])
        .observe(duration.as_secs_f64());

    debug!(
        "{} request completed with {} in {:?}",
        method, response.status, duration
    );

    response.into_response()
}

fn method_label(method: &Method) -> &'static str {
    if *method == Method::GET {
        "GET"
    } else if *method == Method::POST {
        "POST"
    } else if *method == Method::OPTIONS {
        "OPTIONS"
    } else {
        OTHER_METHOD_LABEL
    }
}
