use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::list::ListSettings;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub list_cache_expire_secs: u64,
    pub list_cache_max_count: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub hydration_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000),
            // 列表缓存默认保留两天
            list_cache_expire_secs: parse_or("LIST_CACHE_EXPIRE", 3600 * 24 * 2),
            list_cache_max_count: parse_or("LIST_CACHE_MAX_COUNT", 300),
            default_page_size: parse_or("DEFAULT_PAGE_SIZE", 10),
            max_page_size: parse_or("MAX_PAGE_SIZE", 100),
            hydration_concurrency: parse_or("HYDRATION_CONCURRENCY", 16),
        })
    }

    pub fn list_cache_expire(&self) -> Duration {
        Duration::from_secs(self.list_cache_expire_secs)
    }

    /// 列表缓存子系统使用的配置
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            cache_ttl: self.list_cache_expire(),
            max_cached: self.list_cache_max_count.max(1),
            default_page_size: self.default_page_size.max(1),
            max_page_size: self.max_page_size.max(self.default_page_size).max(1),
            hydration_concurrency: self.hydration_concurrency.max(1),
        }
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
