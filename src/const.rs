// 应用常量定义

//
// 配置参数限制常量
//

// 应用关闭等待时间限制
pub mod shutdown_timeout {
    // 默认值
    pub const DEFAULT: u64 = 30;
    // 最小值
    pub const MIN: u64 = 1;
    // 最大值
    pub const MAX: u64 = 120;
}

// HTTP客户端配置限制
pub mod http_client_limits {
    // 默认连接超时（秒）
    pub const DEFAULT_CONNECT_TIMEOUT: u64 = 3;
    // 最小连接超时（秒）
    pub const MIN_CONNECT_TIMEOUT: u64 = 1;
    // 最大连接超时（秒）
    pub const MAX_CONNECT_TIMEOUT: u64 = 120;
    // 默认请求超时（秒）
    pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;
    // 最小请求超时（秒）
    pub const MIN_REQUEST_TIMEOUT: u64 = 1;
    // 最大请求超时（秒）
    pub const MAX_REQUEST_TIMEOUT: u64 = 1200;
    // 默认空闲超时（秒）
    pub const DEFAULT_IDLE_TIMEOUT: u64 = 10;
    // 最小空闲超时（秒）
    pub const MIN_IDLE_TIMEOUT: u64 = 5;
    // 最大空闲超时（秒）
    pub const MAX_IDLE_TIMEOUT: u64 = 1800;
    // 默认keepalive时间（秒）
    pub const DEFAULT_KEEPALIVE: u32 = 30;
    // 最小keepalive时间（秒）
    pub const MIN_KEEPALIVE: u32 = 5;
    // 最大keepalive时间（秒）
    pub const MAX_KEEPALIVE: u32 = 600;
}

// 入站请求体大小限制（字节）
pub mod body_limits {
    // 默认值，一个完整的 DNS 消息最大 65535 字节
    pub const DEFAULT_MAX_SIZE: usize = 65535;
    // 最小值
    pub const MIN_SIZE: usize = 512;
    // 最大值 - 1MB
    pub const MAX_SIZE: usize = 1024 * 1024;
}

//
// 指标标签常量
//

// 上游错误类型标签
pub mod error_labels {
    // 读取入站请求体失败
    pub const INBOUND_READ: &str = "inbound_read";
    // 上游传输错误
    pub const UPSTREAM_TRANSPORT: &str = "upstream_transport";
    // 上游超时
    pub const UPSTREAM_TIMEOUT: &str = "upstream_timeout";
    // 上游连接失败
    pub const UPSTREAM_CONNECT: &str = "upstream_connect";
    // 读取上游响应体失败
    pub const UPSTREAM_BODY: &str = "upstream_body";
}

// 上游状态码分类标签
pub mod status_class_labels {
    pub const SUCCESS: &str = "2xx";
    pub const REDIRECT: &str = "3xx";
    pub const CLIENT_ERROR: &str = "4xx";
    pub const SERVER_ERROR: &str = "5xx";
    pub const OTHER: &str = "other";
}

// 子系统名称
pub mod subsystem_names {
    // 代理服务器子系统
    pub const PROXY_SERVER: &str = "proxy_server";
    // 管理服务器子系统
    pub const ADMIN_SERVER: &str = "admin_server";
}

// 服务器默认值
pub mod server_defaults {
    // 默认代理监听地址
    pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
    // 默认代理路由路径
    pub const DEFAULT_PATH: &str = "/dns-query";
    // 默认管理服务器监听地址
    pub const DEFAULT_ADMIN_LISTEN: &str = "127.0.0.1:9000";
}

// 上游默认值
pub mod upstream_defaults {
    // 默认DoH服务器
    pub const DEFAULT_DOH_SERVER: &str = "https://dns.adguard-dns.com/dns-query";
}

// HTTP头常量
pub mod http_headers {
    // 逐跳头部，转发响应时必须剥离
    pub const HOP_BY_HOP: [&str; 8] = [
        "transfer-encoding",
        "connection",
        "keep-alive",
        "proxy-authenticate",
        "proxy-authorization",
        "te",
        "trailers",
        "upgrade",
    ];

    // 内容类型常量
    pub mod content_types {
        // DNS JSON内容类型
        pub const DNS_JSON: &str = "application/dns-json";
        // JSON内容类型
        pub const JSON: &str = "application/json";
    }

    // CORS 头部取值
    pub mod cors {
        pub const ALLOW_ORIGIN: &str = "*";
        pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
        pub const ALLOW_HEADERS: &str = "Content-Type, Accept";
    }
}

// 代理生成的错误信息
pub mod error_messages {
    // 不允许的请求方法
    pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
    // 转发失败
    pub const PROXY_FAILURE: &str = "Failed to proxy request";
}
