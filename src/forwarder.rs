// src/forwarder.rs
//
// DoH 转发核心：一次入站请求对应一次上游往返
// 方法检查 -> CORS 预检 -> 构造出站请求 -> 发送 -> 回传响应

use crate::error::ProxyError;
use crate::metrics::{status_class, METRICS};
use crate::r#const::http_headers::{self, content_types, cors};
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

/// 入站请求
pub struct InboundRequest {
    /// 请求方法
    pub method: Method,
    /// 路径与原始查询串
    pub uri: Uri,
    /// 请求头（名称大小写不敏感）
    pub headers: HeaderMap,
    /// 请求体，仅 POST 时读取
    pub body: Body,
}

impl From<Request<Body>> for InboundRequest {
    fn from(request: Request<Body>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }
}

/// 发往上游的请求
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// 上游返回的原始响应
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// 返回给客户端的响应
#[derive(Debug)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundResponse {
    /// CORS 预检响应：204，无响应体
    pub fn preflight() -> Self {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers);
        Self {
            status: StatusCode::NO_CONTENT,
            headers,
            body: Bytes::new(),
        }
    }

    /// 从上游响应构造：状态码原样保留，剥离逐跳头部，追加 CORS 头部
    pub fn relay(upstream: UpstreamResponse) -> Self {
        let mut headers = filter_response_headers(&upstream.headers);
        apply_cors_headers(&mut headers);
        Self {
            status: upstream.status,
            headers,
            body: upstream.body,
        }
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// DoH 转发器
///
/// 只持有不可变的上游地址和自带连接池的 HTTP 客户端，可直接在并发请求间共享
pub struct Forwarder {
    client: Client,
    upstream: Url,
    max_body_size: usize,
}

impl Forwarder {
    /// 创建转发器
    pub fn new(client: Client, upstream: Url, max_body_size: usize) -> Self {
        Self {
            client,
            upstream,
            max_body_size,
        }
    }

    /// 上游地址
    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// 入站请求体上限（字节）
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// 处理一次入站请求
    ///
    /// 总是返回一个完整的响应，错误在这里被转换为 JSON 错误响应
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        match self.forward(request).await {
            Ok(response) => response,
            Err(err) => {
                match err.error_label() {
                    Some(label) => {
                        error!("DNS proxy error: {}", err);
                        METRICS
                            .upstream_errors_total()
                            .with_label_values(&[label])
                            .inc();
                    }
                    None => warn!("Rejected request: {}", err),
                }
                OutboundResponse::from(err)
            }
        }
    }

    /// 转发流程，任一步骤失败都返回 ProxyError
    pub async fn forward(&self, request: InboundRequest) -> Result<OutboundResponse, ProxyError> {
        let InboundRequest {
            method,
            uri,
            headers,
            body,
        } = request;

        // 方法检查
        if !is_allowed_method(&method) {
            return Err(ProxyError::MethodNotAllowed(method));
        }

        // CORS 预检不访问上游
        if method == Method::OPTIONS {
            return Ok(OutboundResponse::preflight());
        }

        // 读取完整请求体
        let body = if method == Method::POST {
            Some(read_body(body, self.max_body_size).await?)
        } else {
            None
        };

        let outbound = OutboundRequest {
            url: build_target_url(&self.upstream, &method, uri.query()),
            headers: filter_request_headers(&method, &headers),
            method,
            body,
        };

        let upstream = self.dispatch(outbound).await?;
        Ok(OutboundResponse::relay(upstream))
    }

    /// 向上游发送请求并读取完整响应
    async fn dispatch(&self, outbound: OutboundRequest) -> Result<UpstreamResponse, ProxyError> {
        let start_time = Instant::now();
        let method_label = outbound.method.as_str().to_string();

        debug!("Forwarding {} request to {}", outbound.method, outbound.url);

        METRICS
            .upstream_requests_total()
            .with_label_values(&[method_label.as_str()])
            .inc();

        let mut request = self
            .client
            .request(outbound.method, outbound.url.as_str())
            .headers(outbound.headers);
        if let Some(body) = outbound.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let duration = start_time.elapsed();
        METRICS
            .upstream_duration_seconds()
            .with_label_values(&[method_label.as_str()])
            .observe(duration.as_secs_f64());
        METRICS
            .upstream_status_total()
            .with_label_values(&[status_class(status)])
            .inc();

        debug!(
            "Upstream responded with {} ({} bytes) in {:?}",
            status,
            body.len(),
            duration
        );

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// 仅允许 GET、POST、OPTIONS
pub fn is_allowed_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::POST || *method == Method::OPTIONS
}

/// 构造上游目标地址
///
/// GET 请求的查询串原样追加，不做解析；POST 请求从不携带查询串
pub fn build_target_url(base: &Url, method: &Method, query: Option<&str>) -> String {
    match query {
        Some(query) if *method == Method::GET && !query.is_empty() => {
            format!("{}?{}", base.as_str(), query)
        }
        _ => base.as_str().to_string(),
    }
}

/// 过滤入站请求头
///
/// 只保留 Accept（缺省为 application/dns-json）和 POST 的 Content-Type，
/// Host 等其余头部全部丢弃
pub fn filter_request_headers(method: &Method, inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let mut accept = inbound.get_all(header::ACCEPT).iter().peekable();
    if accept.peek().is_none() {
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(content_types::DNS_JSON),
        );
    } else {
        for value in accept {
            headers.append(header::ACCEPT, value.clone());
        }
    }

    if *method == Method::POST {
        if let Some(content_type) = inbound.get(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
    }

    headers
}

/// 复制上游响应头，剥离逐跳头部
pub fn filter_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        // HeaderName 总是小写存储
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// 是否为逐跳头部
pub fn is_hop_by_hop(name: &str) -> bool {
    http_headers::HOP_BY_HOP
        .iter()
        .any(|hop| hop.eq_ignore_ascii_case(name))
}

/// 设置 CORS 头部，覆盖已有取值
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(cors::ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(cors::ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(cors::ALLOW_HEADERS),
    );
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::InboundRead(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://dns.adguard-dns.com/dns-query").unwrap()
    }

    #[test]
    fn test_allowed_methods() {
        assert!(is_allowed_method(&Method::GET));
        assert!(is_allowed_method(&Method::POST));
        assert!(is_allowed_method(&Method::OPTIONS));
        assert!(!is_allowed_method(&Method::PUT));
        assert!(!is_allowed_method(&Method::DELETE));
        assert!(!is_allowed_method(&Method::HEAD));
        assert!(!is_allowed_method(&Method::PATCH));
    }

    #[test]
    fn test_target_url_get_with_query() {
        let url = build_target_url(&base_url(), &Method::GET, Some("name=example.com&type=A"));
        assert_eq!(
            url,
            "https://dns.adguard-dns.com/dns-query?name=example.com&type=A"
        );
    }

    #[test]
    fn test_target_url_get_keeps_query_verbatim() {
        let query = "dns=AAABAAABAAAAAAAAB2V4YW1wbGUDY29tAAABAAE&x=%2F%20";
        let url = build_target_url(&base_url(), &Method::GET, Some(query));
        assert!(url.ends_with(query));
    }

    #[test]
    fn test_target_url_without_query() {
        assert_eq!(
            build_target_url(&base_url(), &Method::GET, None),
            "https://dns.adguard-dns.com/dns-query"
        );
        assert_eq!(
            build_target_url(&base_url(), &Method::GET, Some("")),
            "https://dns.adguard-dns.com/dns-query"
        );
    }

    #[test]
    fn test_target_url_post_drops_query() {
        assert_eq!(
            build_target_url(&base_url(), &Method::POST, Some("dns=abc")),
            "https://dns.adguard-dns.com/dns-query"
        );
    }

    #[test]
    fn test_request_headers_default_accept() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("evil.example"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
        inbound.insert(header::COOKIE, HeaderValue::from_static("session=1"));

        let headers = filter_request_headers(&Method::GET, &inbound);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/dns-json");
    }

    #[test]
    fn test_request_headers_forward_accept() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/dns-message"),
        );

        let headers = filter_request_headers(&Method::GET, &inbound);
        assert_eq!(
            headers.get(header::ACCEPT).unwrap(),
            "application/dns-message"
        );
    }

    #[test]
    fn test_request_headers_content_type_only_for_post() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/dns-message"),
        );

        let get_headers = filter_request_headers(&Method::GET, &inbound);
        assert!(get_headers.get(header::CONTENT_TYPE).is_none());

        let post_headers = filter_request_headers(&Method::POST, &inbound);
        assert_eq!(
            post_headers.get(header::CONTENT_TYPE).unwrap(),
            "application/dns-message"
        );
    }

    #[test]
    fn test_response_headers_strip_hop_by_hop() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.insert(header::CONNECTION, HeaderValue::from_static("close"));
        upstream.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        upstream.insert(header::PROXY_AUTHENTICATE, HeaderValue::from_static("Basic"));
        upstream.insert(header::PROXY_AUTHORIZATION, HeaderValue::from_static("x"));
        upstream.insert(header::TE, HeaderValue::from_static("trailers"));
        upstream.insert(header::TRAILER, HeaderValue::from_static("Expires"));
        upstream.insert("trailers", HeaderValue::from_static("Expires"));
        upstream.insert(header::UPGRADE, HeaderValue::from_static("h2c"));
        upstream.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/dns-message"),
        );
        upstream.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=300"));

        let headers = filter_response_headers(&upstream);
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get(header::PROXY_AUTHENTICATE).is_none());
        assert!(headers.get(header::PROXY_AUTHORIZATION).is_none());
        assert!(headers.get(header::TE).is_none());
        assert!(headers.get("trailers").is_none());
        assert!(headers.get(header::UPGRADE).is_none());
        // "trailer" 不在剥离列表中
        assert!(headers.get(header::TRAILER).is_some());
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/dns-message"
        );
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "max-age=300");
    }

    #[test]
    fn test_response_headers_keep_repeated_values() {
        let mut upstream = HeaderMap::new();
        upstream.append(header::VARY, HeaderValue::from_static("Accept"));
        upstream.append(header::VARY, HeaderValue::from_static("Origin"));

        let headers = filter_response_headers(&upstream);
        assert_eq!(headers.get_all(header::VARY).iter().count(), 2);
    }

    #[test]
    fn test_hop_by_hop_case_insensitive() {
        assert!(is_hop_by_hop("Transfer-Encoding"));
        assert!(is_hop_by_hop("KEEP-ALIVE"));
        assert!(!is_hop_by_hop("Content-Type"));
    }

    #[test]
    fn test_preflight_response() {
        let response = OutboundResponse::preflight();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(response.body.is_empty());
        assert_eq!(
            response
                .headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(
            response
                .headers
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            "GET, POST, OPTIONS"
        );
        assert_eq!(
            response
                .headers
                .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
                .unwrap(),
            "Content-Type, Accept"
        );
    }

    #[test]
    fn test_relay_overrides_upstream_cors() {
        let mut upstream_headers = HeaderMap::new();
        upstream_headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://only.example"),
        );
        let response = OutboundResponse::relay(UpstreamResponse {
            status: StatusCode::BAD_GATEWAY,
            headers: upstream_headers,
            body: Bytes::from_static(b"{\"ok\":false}"),
        });

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            response
                .headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(&response.body[..], b"{\"ok\":false}");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let result = read_body(Body::from(vec![0u8; 1024]), 512).await;
        assert!(matches!(result, Err(ProxyError::InboundRead(_))));
    }
}
