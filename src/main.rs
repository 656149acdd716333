use dnsreroute::{
    r#const::server_defaults, subsystem_names, AdminServer, AppError, Args, Config, Forwarder,
    HttpClient, ProxyServer,
};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
use tracing::{error, info, warn};

// 使用 mimalloc 分配器提高内存效率
#[global_allocator]
static GLOBAL: MiMalloc = mimalloc::MiMalloc;

fn init_logging(args: &Args) {
    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_line_number(false);

    // 如果启用调试模式，输出调试信息，否则只输出 info 及以上级别
    if args.debug {
        builder.with_max_level(tracing::Level::DEBUG)
    } else {
        builder.with_max_level(tracing::Level::INFO)
    }
    .init();
}

// 程序入口
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 解析命令行参数
    let args = Args::parse_args();

    // 初始化日志
    init_logging(&args);

    // 验证参数
    if let Err(e) = args.validation() {
        error!("Invalid command line arguments: {}", e);
        process::exit(1);
    }

    info!("Starting DNS-over-HTTPS reroute proxy");

    // 加载配置
    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => {
                info!("Successfully loaded configuration: {:?}", path);
                config
            }
            Err(e) => {
                error!("Failed to load configuration file: {}", e);
                process::exit(1);
            }
        },
        None => {
            info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    // 如果是测试模式，成功验证配置后退出
    if args.test_config {
        info!("Configuration file validation successful");
        return Ok(());
    }

    // 创建应用组件
    let components = match create_components(config) {
        Ok(components) => components,
        Err(e) => {
            error!("Failed to create application components: {}", e);
            process::exit(1);
        }
    };

    // 创建优雅关闭顶层管理器
    let toplevel = Toplevel::new(|s| async move {
        // 启动代理服务器子系统
        let proxy_server = components.proxy_server;
        s.start(SubsystemBuilder::new(
            subsystem_names::PROXY_SERVER,
            move |s| async move { proxy_server.run(s).await },
        ));
        // 启动管理服务器子系统
        let admin_server = components.admin_server;
        s.start(SubsystemBuilder::new(
            subsystem_names::ADMIN_SERVER,
            move |s| async move { admin_server.run(s).await },
        ));
    });

    // 等待关闭
    info!("All services started, waiting for requests...");
    match toplevel
        .catch_signals()
        .handle_shutdown_requests(tokio::time::Duration::from_secs(args.shutdown_timeout))
        .await
    {
        Ok(_) => {
            info!("Application gracefully shut down");
            Ok(())
        }
        Err(e) => {
            error!("Application shutdown error: {}", e);
            process::exit(1);
        }
    }
}

// 应用组件
struct AppComponents {
    // 代理服务器
    proxy_server: ProxyServer,
    // 管理服务器
    admin_server: AdminServer,
}

// 创建应用组件
fn create_components(config: Config) -> Result<AppComponents, AppError> {
    // 创建管理服务器
    let admin_listen_addr: SocketAddr = match &config.admin {
        Some(admin_config) => admin_config.listen.parse()?,
        None => {
            warn!(
                "Admin server configuration not provided, using default address {}",
                server_defaults::DEFAULT_ADMIN_LISTEN
            );
            server_defaults::DEFAULT_ADMIN_LISTEN.parse()?
        }
    };
    let admin_server = AdminServer::new(admin_listen_addr);

    // 创建上游HTTP客户端
    let http_client_config = config.http_client.clone().unwrap_or_default();
    let client = HttpClient::create(&http_client_config, config.upstream.proxy.as_deref())?;

    // 创建转发器
    let upstream_url = config.upstream_url()?;
    info!("Upstream DoH server: {}", upstream_url);
    let forwarder = Arc::new(Forwarder::new(
        client,
        upstream_url,
        config.server.max_body_size,
    ));

    // 创建代理服务器
    let proxy_server = ProxyServer::new(
        config.server.listen.parse()?,
        config.server.path.clone(),
        forwarder,
    );

    info!(
        "Proxy server initialized with HTTP: {:?}, path: {:?}",
        config.server.listen, config.server.path
    );

    // 返回应用组件
    Ok(AppComponents {
        proxy_server,
        admin_server,
    })
}
