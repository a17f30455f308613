/// 缓存操作
/// 排序列表缓存的抽象和实现
pub mod memory;
pub mod ranked_list;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::cache::models::CacheEntry;
use crate::list::ListKey;

pub use memory::MemoryRankedListCache;
pub use ranked_list::RedisRankedListCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// 远端有序集合之上的列表缓存
///
/// 读操作（`exists`、`range_desc`、`count`、`lowest`）失败时由调用方中止本次请求；
/// 写操作失败只记日志，依靠过期和下一次冷读自愈。
/// 所有写操作按成员幂等：重复添加同一成员只会更新分数。
#[async_trait]
pub trait RankedListCache: Send + Sync + 'static {
    async fn exists(&self, key: &ListKey) -> Result<bool, CacheError>;

    async fn touch_ttl(&self, key: &ListKey, ttl: Duration) -> Result<(), CacheError>;

    /// 分数在 [min_score, max_score] 内，按分数降序跳过 offset 条后取 limit 条
    async fn range_desc(
        &self,
        key: &ListKey,
        min_score: i64,
        max_score: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, CacheError>;

    async fn add(&self, key: &ListKey, entry: CacheEntry) -> Result<(), CacheError>;

    async fn remove_member(&self, key: &ListKey, member_id: i64) -> Result<(), CacheError>;

    /// 只保留排名最高的 cap 条，其余从低分端删除
    async fn trim_to_cap(&self, key: &ListKey, cap: usize) -> Result<(), CacheError>;

    /// 成员数量（含结束标志位），键不存在时为 0
    async fn count(&self, key: &ListKey) -> Result<usize, CacheError>;

    /// 排名最低的成员
    async fn lowest(&self, key: &ListKey) -> Result<Option<CacheEntry>, CacheError>;

    /// 批量写入、设置有效期并裁剪，用于冷读后的缓存预热
    async fn warm(
        &self,
        key: &ListKey,
        entries: &[CacheEntry],
        ttl: Duration,
        cap: usize,
    ) -> Result<(), CacheError> {
        for entry in entries {
            self.add(key, *entry).await?;
        }
        self.touch_ttl(key, ttl).await?;
        self.trim_to_cap(key, cap).await
    }
}
