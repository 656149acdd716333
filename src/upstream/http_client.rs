use crate::config::HttpClientConfig;
use crate::error::{AppError, HttpClientError, InvalidProxyConfig};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub struct HttpClient;

impl HttpClient {
    // 创建HTTP客户端
    //
    // 返回的客户端自带连接池，可在并发请求间共享，不保存任何请求级数据
    pub fn create(config: &HttpClientConfig, proxy: Option<&str>) -> Result<Client, AppError> {
        debug!(
            "Creating HTTP client for upstream, config: {:?}, proxy: {:?}",
            config, proxy
        );

        // 创建客户端构建器，不跟随重定向，上游的 3xx 原样返回给客户端
        let mut client_builder = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.request_timeout))
            .redirect(reqwest::redirect::Policy::none());

        // 配置TCP keepalive
        if let Some(ref keepalive) = config.keepalive {
            client_builder = client_builder.tcp_keepalive(Duration::from_secs(*keepalive as u64));
        }

        // 配置空闲连接超时
        if let Some(idle_timeout) = config.idle_timeout {
            client_builder = client_builder.pool_idle_timeout(Duration::from_secs(idle_timeout));
        }

        // 配置用户代理
        if let Some(ref agent) = config.agent {
            client_builder = client_builder.user_agent(agent);
        }

        // 配置代理
        if let Some(proxy_url) = proxy {
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url).map_err(|e| {
                AppError::InvalidProxy(InvalidProxyConfig(format!(
                    "Proxy configuration error: {}",
                    e
                )))
            })?);
        }

        // 创建HTTP客户端
        client_builder.build().map_err(|e| {
            AppError::HttpError(HttpClientError(format!(
                "Failed to create HTTP client: {}",
                e
            )))
        })
    }
}
