use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::Path, str::FromStr};
use tracing::debug;
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};

pub mod core;
pub mod upstream;

pub use core::*;
pub use upstream::*;

// 配置结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

// 自定义验证函数 - 验证Socket地址格式
pub fn validate_socket_addr(addr: &str) -> Result<(), ValidationError> {
    match SocketAddr::from_str(addr) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid_socket_addr")),
    }
}

// 自定义验证函数 - 验证路由路径
pub fn validate_route_path(path: &str) -> Result<(), ValidationError> {
    if !path.starts_with('/') || path.contains('?') || path.contains('#') {
        return Err(ValidationError::new("invalid_route_path"));
    }
    Ok(())
}

// 自定义验证函数 - 验证上游URL
//
// 只允许 http/https，必须带有非根路径，且不能携带查询串或片段，查询串由 GET 请求原样追加
pub fn validate_upstream_url(url_str: &str) -> Result<(), ValidationError> {
    let url = Url::parse(url_str).map_err(|_| ValidationError::new("invalid_url"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new("invalid_url_scheme"));
    }
    if url.host_str().is_none() {
        return Err(ValidationError::new("missing_url_host"));
    }
    // "http://host" 会被规范化为 "http://host/"，转发地址将与配置文本不一致
    if url.path() == "/" {
        return Err(ValidationError::new("missing_url_path"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::new("unexpected_url_query"));
    }
    Ok(())
}

// 自定义验证函数 - 验证出站代理URL
pub fn validate_proxy_url(url_str: &str) -> Result<(), ValidationError> {
    match Url::parse(url_str) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid_proxy_url")),
    }
}

// 应用配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate, Default)]
#[serde(rename_all = "lowercase")]
pub struct Config {
    // 代理服务器配置
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,
    // 管理服务器配置（可选）
    #[serde(default)]
    #[validate(nested)]
    pub admin: Option<AdminConfig>,
    // HTTP客户端配置（可选）
    #[serde(default)]
    #[validate(nested)]
    pub http_client: Option<HttpClientConfig>,
    // 上游配置
    #[serde(default)]
    #[validate(nested)]
    pub upstream: UpstreamConfig,
}

impl Config {
    // 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        debug!("Loading configuration file: {:?}", path.as_ref());
        let content = fs::read_to_string(path).map_err(ConfigError::LoadError)?;
        Self::from_yaml(&content)
    }

    // 从YAML字符串加载配置
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    // 验证配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        // 使用 validator 库进行验证
        if let Err(errors) = Validate::validate(self) {
            return Err(ConfigError::ValidationError(format_validation_errors(
                &errors,
            )));
        }
        Ok(())
    }

    // 解析后的上游URL
    pub fn upstream_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.upstream.url)
            .map_err(|e| ConfigError::InvalidUpstreamUrl(format!("{}: {}", self.upstream.url, e)))
    }
}

// 将 ValidationErrors 转换为友好的错误信息
fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    // 格式化字段错误
    for (field, error_kind) in errors.errors() {
        match error_kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    messages.push(format!("Field '{}': {}", field, message));
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errors) => {
                messages.push(format!(
                    "Struct '{}' validation failed: {}",
                    field,
                    format_validation_errors(struct_errors)
                ));
            }
            validator::ValidationErrorsKind::List(list_errors) => {
                for (index, err) in list_errors {
                    messages.push(format!(
                        "List '{}' at index {}: {}",
                        field,
                        index,
                        format_validation_errors(err)
                    ));
                }
            }
        }
    }

    if messages.is_empty() {
        "Unknown validation error".to_string()
    } else {
        messages.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url_validation() {
        assert!(validate_upstream_url("https://dns.adguard-dns.com/dns-query").is_ok());
        assert!(validate_upstream_url("http://127.0.0.1:8053/dns-query").is_ok());
        assert!(validate_upstream_url("ftp://dns.example.com/dns-query").is_err());
        assert!(validate_upstream_url("https://dns.example.com/dns-query?dns=abc").is_err());
        assert!(validate_upstream_url("https://dns.example.com/dns-query#frag").is_err());
        assert!(validate_upstream_url("not a url").is_err());
        assert!(validate_upstream_url("http://127.0.0.1:8053").is_err());
        assert!(validate_upstream_url("https://dns.example.com/").is_err());
    }

    #[test]
    fn test_route_path_validation() {
        assert!(validate_route_path("/dns-query").is_ok());
        assert!(validate_route_path("/api/dns-reroute").is_ok());
        assert!(validate_route_path("dns-query").is_err());
        assert!(validate_route_path("/dns-query?x=1").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.upstream_url().unwrap().as_str(),
            "https://dns.adguard-dns.com/dns-query"
        );
    }
}
