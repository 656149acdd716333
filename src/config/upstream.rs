use crate::r#const::upstream_defaults;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_proxy_url, validate_upstream_url};

// 上游 DoH 服务器配置
//
// 上游地址只来自配置，绝不从客户端请求中推导
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct UpstreamConfig {
    // DoH服务器URL
    #[serde(default = "default_upstream_url")]
    #[validate(custom(function = "validate_upstream_url"))]
    pub url: String,
    // 出站HTTP代理（可选）
    #[serde(default)]
    #[validate(custom(function = "validate_proxy_url"))]
    pub proxy: Option<String>,
}

fn default_upstream_url() -> String {
    upstream_defaults::DEFAULT_DOH_SERVER.to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            proxy: None,
        }
    }
}
