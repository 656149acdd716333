// src/proxy/mod.rs
//
// DoH 转发代理的 HTTP 服务器模块:
// - 单一路由，按请求方法分派
// - GET/POST 转发到上游，OPTIONS 直接返回 CORS 预检响应

// 子模块定义
pub mod handlers;
pub mod server;
pub mod state;

// 公开导出
pub use server::ProxyServer;
