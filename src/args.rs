use crate::error::AppError;
use crate::r#const::shutdown_timeout;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

// DNS-over-HTTPS 转发代理服务
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dnsreroute",
    author,
    version,
    about = "A stateless DNS-over-HTTPS forwarding proxy\n\n\
             Key Features:\n\
             - Passthrough: GET query strings and POST bodies relayed byte-for-byte (RFC 8484 and JSON)\n\
             - Fixed Upstream: a single configured DoH resolver, never derived from client input\n\
             - Header Hygiene: hop-by-hop headers stripped, only Accept and Content-Type forwarded\n\
             - CORS: browser preflight handled locally, CORS headers on every relayed response\n\
             - Observability: health check and Prometheus metrics on a separate admin listener"
)]
pub struct Args {
    // 配置文件路径（可选，未指定时使用内置默认配置）
    #[arg(short, long, help = "Path to the YAML configuration file")]
    pub config: Option<PathBuf>,

    // 测试配置
    #[arg(
        short = 't',
        long = "test",
        action = ArgAction::SetTrue,
        help = "Test configuration file for validity and exit"
    )]
    pub test_config: bool,

    // 启用调试日志
    #[arg(
        short = 'd',
        long = "debug",
        action = ArgAction::SetTrue,
        help = "Enable debug level logging for detailed output"
    )]
    pub debug: bool,

    // 关闭超时
    #[arg(
        long = "shutdown-timeout",
        help = "Maximum time in seconds to wait for complete shutdown",
        default_value_t = shutdown_timeout::DEFAULT
    )]
    pub shutdown_timeout: u64,
}

impl Args {
    // 解析命令行参数
    pub fn parse_args() -> Self {
        Args::parse()
    }

    // 验证参数
    pub fn validation(&self) -> Result<(), AppError> {
        if self.shutdown_timeout < shutdown_timeout::MIN
            || self.shutdown_timeout > shutdown_timeout::MAX
        {
            return Err(AppError::InvalidShutdownTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["dnsreroute"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.test_config);
        assert!(!args.debug);
        assert_eq!(args.shutdown_timeout, shutdown_timeout::DEFAULT);
        assert!(args.validation().is_ok());
    }

    #[test]
    fn test_flags() {
        let args =
            Args::try_parse_from(["dnsreroute", "-c", "/etc/dnsreroute.yaml", "-t", "-d"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/dnsreroute.yaml")));
        assert!(args.test_config);
        assert!(args.debug);
    }

    #[test]
    fn test_shutdown_timeout_range() {
        let args = Args::try_parse_from(["dnsreroute", "--shutdown-timeout", "0"]).unwrap();
        assert_matches!(args.validation(), Err(AppError::InvalidShutdownTimeout));

        let args = Args::try_parse_from(["dnsreroute", "--shutdown-timeout", "121"]).unwrap();
        assert_matches!(args.validation(), Err(AppError::InvalidShutdownTimeout));
    }
}
