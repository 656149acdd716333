// src/proxy/state.rs

use crate::forwarder::Forwarder;
use std::sync::Arc;

/// 应用程序状态结构体
#[derive(Clone)]
pub struct AppState {
    /// DoH 转发器
    pub forwarder: Arc<Forwarder>,
}
