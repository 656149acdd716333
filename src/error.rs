use crate::forwarder::OutboundResponse;
use crate::r#const::{error_labels, error_messages, http_headers};
use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::io;
use std::net::AddrParseError;
use thiserror::Error;

// Unified error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(#[from] InvalidProxyConfig),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] HttpClientError),

    #[error("Invalid shutdown timeout")]
    InvalidShutdownTimeout,
}

impl From<AddrParseError> for AppError {
    fn from(err: AddrParseError) -> Self {
        Self::Config(ConfigError::InvalidListenAddress(err.to_string()))
    }
}

// 出站代理配置错误
#[derive(Error, Debug)]
#[error("{0}")]
pub struct InvalidProxyConfig(pub String);

// HTTP客户端构建错误
#[derive(Error, Debug)]
#[error("{0}")]
pub struct HttpClientError(pub String);

// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadError(#[from] io::Error),

    #[error("YAML parsing error: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid server listen address: {0}")]
    InvalidListenAddress(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// 单次转发请求中的错误
///
/// 所有变体都在处理器边界被转换成 JSON 响应，不会向上传播
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    #[error("Failed to read request body: {0}")]
    InboundRead(String),

    #[error("{0}")]
    UpstreamTransport(#[from] reqwest::Error),
}

impl ProxyError {
    /// 响应状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::InboundRead(_) | Self::UpstreamTransport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 指标中使用的错误类型标签，方法错误不计入上游错误
    pub fn error_label(&self) -> Option<&'static str> {
        match self {
            Self::MethodNotAllowed(_) => None,
            Self::InboundRead(_) => Some(error_labels::INBOUND_READ),
            Self::UpstreamTransport(e) if e.is_timeout() => Some(error_labels::UPSTREAM_TIMEOUT),
            Self::UpstreamTransport(e) if e.is_connect() => Some(error_labels::UPSTREAM_CONNECT),
            Self::UpstreamTransport(e) if e.is_body() || e.is_decode() => {
                Some(error_labels::UPSTREAM_BODY)
            }
            Self::UpstreamTransport(_) => Some(error_labels::UPSTREAM_TRANSPORT),
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::MethodNotAllowed(_) => ErrorBody {
                error: error_messages::METHOD_NOT_ALLOWED.to_string(),
                details: None,
            },
            Self::InboundRead(_) | Self::UpstreamTransport(_) => ErrorBody {
                error: error_messages::PROXY_FAILURE.to_string(),
                details: Some(self.to_string()),
            },
        }
    }
}

/// 代理生成的错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<ProxyError> for OutboundResponse {
    fn from(err: ProxyError) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(http_headers::content_types::JSON),
        );
        Self {
            status: err.status_code(),
            headers,
            body: Bytes::from(serde_json::to_vec(&err.body()).unwrap_or_default()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        OutboundResponse::from(self).into_response()
    }
}
