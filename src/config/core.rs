use crate::r#const::{body_limits, http_client_limits, server_defaults};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_route_path, validate_socket_addr};

// HTTP客户端配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct HttpClientConfig {
    // 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    #[validate(range(
        min = http_client_limits::MIN_CONNECT_TIMEOUT,
        max = http_client_limits::MAX_CONNECT_TIMEOUT,
        message = "Connect timeout must be between {} and {} seconds"
    ))]
    pub connect_timeout: u64,
    // 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    #[validate(range(
        min = http_client_limits::MIN_REQUEST_TIMEOUT,
        max = http_client_limits::MAX_REQUEST_TIMEOUT,
        message = "Request timeout must be between {} and {} seconds"
    ))]
    pub request_timeout: u64,
    // 空闲连接超时（秒）（可选）
    #[serde(default = "default_idle_timeout")]
    #[validate(range(
        min = http_client_limits::MIN_IDLE_TIMEOUT,
        max = http_client_limits::MAX_IDLE_TIMEOUT,
        message = "Idle timeout must be between {} and {} seconds"
    ))]
    pub idle_timeout: Option<u64>,
    // TCP Keepalive（秒）（可选）
    #[serde(default = "default_keepalive")]
    #[validate(range(
        min = http_client_limits::MIN_KEEPALIVE,
        max = http_client_limits::MAX_KEEPALIVE,
        message = "Keepalive must be between {} and {} seconds"
    ))]
    pub keepalive: Option<u32>,
    // HTTP用户代理（可选）
    #[serde(default)]
    pub agent: Option<String>,
}

fn default_connect_timeout() -> u64 {
    http_client_limits::DEFAULT_CONNECT_TIMEOUT
}

fn default_request_timeout() -> u64 {
    http_client_limits::DEFAULT_REQUEST_TIMEOUT
}

fn default_idle_timeout() -> Option<u64> {
    Some(http_client_limits::DEFAULT_IDLE_TIMEOUT)
}

fn default_keepalive() -> Option<u32> {
    Some(http_client_limits::DEFAULT_KEEPALIVE)
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            idle_timeout: default_idle_timeout(),
            keepalive: default_keepalive(),
            agent: None,
        }
    }
}

// 代理服务器配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct ServerConfig {
    // 监听地址
    #[serde(default = "default_listen")]
    #[validate(custom(function = "validate_socket_addr"))]
    pub listen: String,
    // 路由路径
    #[serde(default = "default_path")]
    #[validate(custom(function = "validate_route_path"))]
    pub path: String,
    // 入站请求体最大字节数
    #[serde(default = "default_max_body_size")]
    #[validate(range(
        min = body_limits::MIN_SIZE,
        max = body_limits::MAX_SIZE,
        message = "Max body size must be between {} and {} bytes"
    ))]
    pub max_body_size: usize,
}

fn default_listen() -> String {
    server_defaults::DEFAULT_LISTEN.to_string()
}

fn default_path() -> String {
    server_defaults::DEFAULT_PATH.to_string()
}

fn default_max_body_size() -> usize {
    body_limits::DEFAULT_MAX_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            max_body_size: default_max_body_size(),
        }
    }
}

// 管理服务器配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct AdminConfig {
    // 管理服务器监听地址
    #[validate(custom(function = "validate_socket_addr"))]
    pub listen: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            listen: server_defaults::DEFAULT_ADMIN_LISTEN.to_string(),
        }
    }
}
