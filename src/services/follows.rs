// 关注服务
// 关注列表和粉丝列表，每一项带上对方的关注数和粉丝数

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::RankedListCache;
use crate::cache::models::CacheEntry;
use crate::database::models::{FollowCountEntity, FollowEntity};
use crate::database::{FollowStore, StoreError};
use crate::error::AppError;
use crate::list::{ListKey, ListKind, ListSettings, ListSource, Page, PageRequest, RankedListReader};

/// 列表中的一个用户
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUserItem {
    pub user_id: i64,
    /// 关系成为关注状态的时间
    pub follow_time: DateTime<Utc>,
    pub follow_count: i64,
    pub fans_count: i64,
}

/// 关注列表和粉丝列表共用的数据来源，按列表种类区分方向
pub struct FollowListSource {
    store: Arc<dyn FollowStore>,
}

impl FollowListSource {
    pub fn new(store: Arc<dyn FollowStore>) -> Self {
        Self { store }
    }

    /// 关系中"另一方"的用户 id
    fn related_user(key: &ListKey, edge: &FollowEntity) -> i64 {
        match key.kind {
            ListKind::Fans => edge.user_id,
            _ => edge.followed_user_id,
        }
    }

    /// 批量查询计数并组装列表项，没有计数行的用户按 0 处理
    async fn with_counts(
        &self,
        key: &ListKey,
        edges: Vec<FollowEntity>,
    ) -> Result<Vec<FollowUserItem>, StoreError> {
        let user_ids: Vec<i64> = edges
            .iter()
            .map(|edge| Self::related_user(key, edge))
            .collect();

        let mut counts: HashMap<i64, FollowCountEntity> = HashMap::new();
        for count in self.store.counts_by_user_ids(&user_ids).await? {
            counts.insert(count.user_id, count);
        }

        Ok(edges
            .iter()
            .map(|edge| {
                let user_id = Self::related_user(key, edge);
                let count = counts.get(&user_id);
                FollowUserItem {
                    user_id,
                    follow_time: edge.update_time,
                    follow_count: count.map_or(0, |c| c.follow_count),
                    fans_count: count.map_or(0, |c| c.fans_count),
                }
            })
            .collect())
    }
}

#[async_trait]
impl ListSource for FollowListSource {
    type Item = FollowUserItem;

    async fn window(
        &self,
        key: &ListKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowUserItem>, StoreError> {
        let edges = match key.kind {
            ListKind::Following => {
                self.store
                    .following_page(key.owner_id, offset, limit)
                    .await?
            }
            ListKind::Fans => self.store.fans_page(key.owner_id, offset, limit).await?,
            other => {
                return Err(StoreError::Unavailable(format!(
                    "{other:?} is not a follow list"
                )));
            }
        };
        self.with_counts(key, edges).await
    }

    /// 一次批量查询关系，按缓存中的 id 顺序排列，已取消的关系被过滤掉
    async fn hydrate(&self, key: &ListKey, ids: &[i64]) -> Result<Vec<FollowUserItem>, StoreError> {
        let edges = match key.kind {
            ListKind::Fans => self.store.fans_edges(key.owner_id, ids).await?,
            _ => self.store.following_edges(key.owner_id, ids).await?,
        };

        let mut by_user: HashMap<i64, FollowEntity> = HashMap::new();
        for edge in edges {
            by_user.insert(Self::related_user(key, &edge), edge);
        }
        let ordered: Vec<FollowEntity> = ids.iter().filter_map(|id| by_user.remove(id)).collect();

        self.with_counts(key, ordered).await
    }

    fn entry_of(&self, _key: &ListKey, item: &FollowUserItem) -> CacheEntry {
        CacheEntry::new(item.user_id, item.follow_time.timestamp())
    }
}

pub struct FollowService {
    reader: RankedListReader<FollowListSource>,
}

impl FollowService {
    pub fn new(
        store: Arc<dyn FollowStore>,
        cache: Arc<dyn RankedListCache>,
        settings: ListSettings,
    ) -> Self {
        let source = Arc::new(FollowListSource::new(store));
        Self {
            reader: RankedListReader::new(source, cache, settings),
        }
    }

    /// user_id 关注的人
    pub async fn follow_list(
        &self,
        user_id: i64,
        request: PageRequest,
    ) -> Result<Page<FollowUserItem>, AppError> {
        if user_id <= 0 {
            return Err(AppError::validation("invalid user id"));
        }
        self.reader.page(&ListKey::following(user_id), request).await
    }

    /// 关注 user_id 的人
    pub async fn fans_list(
        &self,
        user_id: i64,
        request: PageRequest,
    ) -> Result<Page<FollowUserItem>, AppError> {
        if user_id <= 0 {
            return Err(AppError::validation("invalid user id"));
        }
        self.reader.page(&ListKey::fans(user_id), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use chrono::TimeZone;

    #[tokio::test]
    async fn hydrate_keeps_cache_order_and_defaults_missing_counts() {
        let store = Arc::new(MemoryStore::new());
        let at = |ts| Utc.timestamp_opt(ts, 0).unwrap();
        store.seed_follow(1, 7, at(100));
        store.seed_follow(1, 3, at(200));
        store.seed_follow(1, 9, at(300));
        store.follow(9, 3).await.unwrap();

        let source = FollowListSource::new(store.clone());
        let key = ListKey::following(1);
        let items = source.hydrate(&key, &[7, 3, 9, 42]).await.unwrap();

        let ids: Vec<i64> = items.iter().map(|i| i.user_id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
        assert_eq!(items[0].fans_count, 0);
        assert_eq!(items[1].fans_count, 1);
        assert_eq!(items[2].follow_count, 1);
    }

    #[tokio::test]
    async fn fans_window_reports_the_follower() {
        let store = Arc::new(MemoryStore::new());
        store.follow(5, 8).await.unwrap();
        store.follow(6, 8).await.unwrap();

        let source = FollowListSource::new(store.clone());
        let items = source.window(&ListKey::fans(8), 0, 10).await.unwrap();
        let mut ids: Vec<i64> = items.iter().map(|i| i.user_id).collect();
        ids.sort();
        assert_eq!(ids, vec![5, 6]);
        assert!(items.iter().all(|i| i.follow_count == 1));
    }
}
