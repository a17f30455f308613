use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::{CacheError, RankedListCache};
use crate::cache::keys::list_key;
use crate::cache::models::CacheEntry;
use crate::list::ListKey;

/// 基于 Redis 有序集合的列表缓存
///
/// 成员是十进制的记录 id，分数是排序维度的数值（时间戳或点赞数）。
pub struct RedisRankedListCache {
    redis_client: Arc<RedisClient>,
}

impl RedisRankedListCache {
    /// 创建新的列表缓存操作实例
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        Ok(self.redis_client.get_multiplexed_async_connection().await?)
    }
}

fn to_entries(pairs: Vec<(i64, f64)>) -> Vec<CacheEntry> {
    pairs
        .into_iter()
        .map(|(member_id, score)| CacheEntry::new(member_id, score as i64))
        .collect()
}

#[async_trait]
impl RankedListCache for RedisRankedListCache {
    async fn exists(&self, key: &ListKey) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(list_key(key)).await?;
        Ok(exists)
    }

    async fn touch_ttl(&self, key: &ListKey, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.expire(list_key(key), ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn range_desc(
        &self,
        key: &ListKey,
        min_score: i64,
        max_score: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        let pairs: Vec<(i64, f64)> = conn
            .zrevrangebyscore_limit_withscores(
                list_key(key),
                max_score,
                min_score,
                offset as isize,
                limit as isize,
            )
            .await?;
        Ok(to_entries(pairs))
    }

    async fn add(&self, key: &ListKey, entry: CacheEntry) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .zadd(list_key(key), entry.member_id, entry.score)
            .await?;
        Ok(())
    }

    async fn remove_member(&self, key: &ListKey, member_id: i64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.zrem(list_key(key), member_id).await?;
        Ok(())
    }

    async fn trim_to_cap(&self, key: &ListKey, cap: usize) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // ZREMRANGEBYRANK 按升序下标删除，-(cap + 1) 即保留最高的 cap 条
        let _: () = conn
            .zremrangebyrank(list_key(key), 0, -(cap as isize + 1))
            .await?;
        Ok(())
    }

    async fn count(&self, key: &ListKey) -> Result<usize, CacheError> {
        let mut conn = self.connection().await?;
        let count: usize = conn.zcard(list_key(key)).await?;
        Ok(count)
    }

    async fn lowest(&self, key: &ListKey) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.connection().await?;
        let pairs: Vec<(i64, f64)> = conn.zrange_withscores(list_key(key), 0, 0).await?;
        Ok(to_entries(pairs).into_iter().next())
    }

    async fn warm(
        &self,
        key: &ListKey,
        entries: &[CacheEntry],
        ttl: Duration,
        cap: usize,
    ) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let key = list_key(key);

        let mut pipe = redis::pipe();
        pipe.atomic();
        for entry in entries {
            pipe.zadd(&key, entry.member_id, entry.score).ignore();
        }
        pipe.expire(&key, ttl.as_secs() as i64)
            .ignore()
            .zremrangebyrank(&key, 0, -(cap as isize + 1))
            .ignore();

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}
