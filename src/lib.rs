pub mod admin;
pub mod args;
pub mod config;
pub mod r#const;
pub mod error;
pub mod forwarder;
pub mod metrics;
pub mod proxy;
pub mod serve;
pub mod upstream;

// 重导出常用组件
pub use admin::AdminServer;
pub use args::Args;
pub use config::Config;
pub use error::{AppError, ProxyError};
pub use forwarder::{Forwarder, InboundRequest, OutboundResponse};
pub use metrics::ProxyMetrics;
pub use proxy::ProxyServer;
pub use r#const::subsystem_names;
pub use upstream::HttpClient;
