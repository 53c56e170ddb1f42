use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://portal.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_url: String,
    pub database_url: String,
    pub http_timeout: Duration,
    /// 启动时自动登录（可选）
    pub login: Option<(String, String)>,
}

impl PortalConfig {
    /// 读取 .env 后再从环境变量组装配置，返回配置和启动提示信息
    pub fn load() -> (Self, Vec<String>) {
        let mut info = Vec::new();
        match dotenv::dotenv() {
            Ok(path) => info.push(format!("✓ 已加载 .env 文件: {}", path.display())),
            Err(_) => info.push("⚠ 未找到 .env 文件，使用系统环境变量".to_string()),
        }
        let cfg = Self::from_env();
        info.push(format!("API 地址: {}", cfg.api_url));
        (cfg, info)
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = non_empty("PORTAL_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let database_url =
            non_empty("PORTAL_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let timeout_secs = non_empty("PORTAL_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30)
            .max(1);
        let login = match (non_empty("PORTAL_USERNAME"), non_empty("PORTAL_PASSWORD")) {
            (Some(u), Some(p)) => Some((u, p)),
            _ => None,
        };

        Self {
            api_url,
            database_url,
            http_timeout: Duration::from_secs(timeout_secs),
            login,
        }
    }
}
