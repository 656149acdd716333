use crate::r#const::status_class_labels;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use once_cell::sync::Lazy;
use prometheus::{opts, HistogramVec, IntCounterVec, Registry};
use tracing::error;

// 全局静态指标实例
pub static METRICS: Lazy<ProxyMetrics> = Lazy::new(ProxyMetrics::new);

// DoH 转发代理指标
//
// 所有采集器内部均为原子操作，可在并发请求间共享
pub struct ProxyMetrics {
    registry: Registry,

    // 1. 入站请求指标
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,

    // 2. 上游 DoH 服务器指标
    upstream_requests_total: IntCounterVec,
    upstream_errors_total: IntCounterVec,
    upstream_duration_seconds: HistogramVec,
    upstream_status_total: IntCounterVec,
}

impl Default for ProxyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyMetrics {
    // 创建新的指标收集器
    pub fn new() -> Self {
        let registry = Registry::new();

        // 1. 入站请求指标
        let requests_total = IntCounterVec::new(
            opts!(
                "dnsreroute_requests_total",
                "Total inbound requests handled by the proxy, classified by method and response status"
            ),
            &["method", "status"],
        )
        .unwrap();

        let request_duration_seconds = HistogramVec::new(
            prometheus::histogram_opts!(
                "dnsreroute_request_duration_seconds",
                "Inbound request handling duration in seconds, classified by method",
                vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
            ),
            &["method"],
        )
        .unwrap();

        // 2. 上游 DoH 服务器指标
        let upstream_requests_total = IntCounterVec::new(
            opts!(
                "dnsreroute_upstream_requests_total",
                "Total requests dispatched to the upstream DoH server, classified by method"
            ),
            &["method"],
        )
        .unwrap();

        let upstream_errors_total = IntCounterVec::new(
            opts!(
                "dnsreroute_upstream_errors_total",
                "Total proxy failures, classified by error type"
            ),
            &["error_type"],
        )
        .unwrap();

        let upstream_duration_seconds = HistogramVec::new(
            prometheus::histogram_opts!(
                "dnsreroute_upstream_duration_seconds",
                "Upstream DoH round trip duration in seconds, classified by method",
                vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
            ),
            &["method"],
        )
        .unwrap();

        let upstream_status_total = IntCounterVec::new(
            opts!(
                "dnsreroute_upstream_status_total",
                "Total upstream responses, classified by status class (2xx, 3xx, 4xx, 5xx)"
            ),
            &["status_class"],
        )
        .unwrap();

        // 创建指标实例
        let metrics = ProxyMetrics {
            registry,
            requests_total,
            request_duration_seconds,
            upstream_requests_total,
            upstream_errors_total,
            upstream_duration_seconds,
            upstream_status_total,
        };

        // 注册所有指标
        metrics.register_all_metrics();

        metrics
    }

    // 注册所有指标
    fn register_all_metrics(&self) {
        // 1. 入站请求指标
        self.registry
            .register(Box::new(self.requests_total.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.request_duration_seconds.clone()))
            .unwrap();

        // 2. 上游 DoH 服务器指标
        self.registry
            .register(Box::new(self.upstream_requests_total.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.upstream_errors_total.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.upstream_duration_seconds.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.upstream_status_total.clone()))
            .unwrap();
    }

    // 导出所有指标为文本格式
    pub fn export_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = String::new();
        encoder.encode_utf8(&metric_families, &mut buffer)?;
        Ok(buffer)
    }

    // 下面是各个指标的getter方法，用于其他模块增加计数或设置值

    // 1. 入站请求指标
    pub fn requests_total(&self) -> &IntCounterVec {
        &self.requests_total
    }

    pub fn request_duration_seconds(&self) -> &HistogramVec {
        &self.request_duration_seconds
    }

    // 2. 上游 DoH 服务器指标
    pub fn upstream_requests_total(&self) -> &IntCounterVec {
        &self.upstream_requests_total
    }

    pub fn upstream_errors_total(&self) -> &IntCounterVec {
        &self.upstream_errors_total
    }

    pub fn upstream_duration_seconds(&self) -> &HistogramVec {
        &self.upstream_duration_seconds
    }

    pub fn upstream_status_total(&self) -> &IntCounterVec {
        &self.upstream_status_total
    }
}

// 状态码分类
pub fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => status_class_labels::SUCCESS,
        300..=399 => status_class_labels::REDIRECT,
        400..=499 => status_class_labels::CLIENT_ERROR,
        500..=599 => status_class_labels::SERVER_ERROR,
        _ => status_class_labels::OTHER,
    }
}

// 提供指标导出路由
pub fn metrics_routes() -> Router {
    Router::new().route(
        "/metrics",
        get(|| async {
            match METRICS.export_metrics() {
                Ok(buffer) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                    buffer,
                )
                    .into_response(),
                Err(e) => {
                    error!("Failed to encode metrics: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }),
    )
}
