#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use beyond::AppState;
use beyond::cache::{CacheEntry, MemoryRankedListCache};
use beyond::database::MemoryStore;
use beyond::database::models::{ArticleEntity, ArticleStatus};
use beyond::list::{ListKey, ListSettings};

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryRankedListCache>,
    pub state: AppState,
}

pub fn harness() -> Harness {
    harness_with(ListSettings::default())
}

pub fn harness_with(settings: ListSettings) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryRankedListCache::new());
    let state = AppState::new(store.clone(), store.clone(), cache.clone(), settings);
    Harness {
        store,
        cache,
        state,
    }
}

pub fn article(id: i64, author_id: i64, publish_ts: i64, likes: i64) -> ArticleEntity {
    let at = Utc.timestamp_opt(publish_ts, 0).unwrap();
    ArticleEntity {
        id,
        title: format!("article {id}"),
        content: format!("content of {id}"),
        cover: String::new(),
        description: String::new(),
        author_id,
        status: ArticleStatus::Visible as i32,
        comment_num: 0,
        like_num: likes,
        publish_time: at,
        create_time: at,
        update_time: at,
    }
}

/// 等待后台预热写入缓存
pub async fn wait_for_cache(cache: &MemoryRankedListCache, key: &ListKey) -> Vec<CacheEntry> {
    for _ in 0..200 {
        if let Some(entries) = cache.snapshot(key) {
            return entries;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("cache for {key:?} was never warmed");
}

/// 等待后台预热把结束标志位写进缓存
pub async fn wait_for_end(cache: &MemoryRankedListCache, key: &ListKey) -> Vec<CacheEntry> {
    for _ in 0..200 {
        if let Some(entries) = cache.snapshot(key) {
            if entries.last().is_some_and(CacheEntry::is_sentinel) {
                return entries;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("cache for {key:?} never reached the end of the list");
}
