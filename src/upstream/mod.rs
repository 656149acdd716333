// 声明子模块
mod http_client;

// 重导出公共API
pub use http_client::HttpClient;
