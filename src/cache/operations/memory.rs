use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;

use super::{CacheError, RankedListCache};
use crate::cache::keys::list_key;
use crate::cache::models::{CacheEntry, rank_order};
use crate::list::ListKey;

#[derive(Default)]
struct SortedSet {
    // 按 Redis ZREVRANGE 的顺序保存：分数降序，同分按成员字符串降序
    entries: Vec<CacheEntry>,
    ttl: Option<Duration>,
}

impl SortedSet {
    fn upsert(&mut self, entry: CacheEntry) {
        self.entries.retain(|e| e.member_id != entry.member_id);
        let pos = self
            .entries
            .binary_search_by(|e| rank_order(e, &entry))
            .unwrap_or_else(|pos| pos);
        self.entries.insert(pos, entry);
    }
}

/// 进程内的列表缓存，语义与 Redis 实现保持一致
///
/// 本地运行和测试使用，支持故障注入：读失败、写失败可以分别打开。
#[derive(Default)]
pub struct MemoryRankedListCache {
    sets: Mutex<HashMap<String, SortedSet>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    range_calls: AtomicUsize,
}

impl MemoryRankedListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// 模拟过期：整个列表被移除
    pub fn expire_now(&self, key: &ListKey) {
        self.lock().remove(&list_key(key));
    }

    /// 当前缓存的全部成员，按排名从高到低
    pub fn snapshot(&self, key: &ListKey) -> Option<Vec<CacheEntry>> {
        self.lock().get(&list_key(key)).map(|s| s.entries.clone())
    }

    pub fn ttl_of(&self, key: &ListKey) -> Option<Duration> {
        self.lock().get(&list_key(key)).and_then(|s| s.ttl)
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(AtomicOrdering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SortedSet>> {
        self.sets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_read(&self) -> Result<(), CacheError> {
        if self.fail_reads.load(AtomicOrdering::SeqCst) {
            return Err(CacheError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), CacheError> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(CacheError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RankedListCache for MemoryRankedListCache {
    async fn exists(&self, key: &ListKey) -> Result<bool, CacheError> {
        self.check_read()?;
        Ok(self.lock().contains_key(&list_key(key)))
    }

    async fn touch_ttl(&self, key: &ListKey, ttl: Duration) -> Result<(), CacheError> {
        self.check_write()?;
        if let Some(set) = self.lock().get_mut(&list_key(key)) {
            set.ttl = Some(ttl);
        }
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
        self.check_read()?;
        self.range_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let sets = self.lock();
        let Some(set) = sets.get(&list_key(key)) else {
            return Ok(Vec::new());
        };
        Ok(set
            .entries
            .iter()
            .filter(|e| e.score >= min_score && e.score <= max_score)
            .skip(offset)
            .take(limit)
            .copied()
            .collect())
    }

    async fn add(&self, key: &ListKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.check_write()?;
        self.lock().entry(list_key(key)).or_default().upsert(entry);
        Ok(())
    }

    async fn remove_member(&self, key: &ListKey, member_id: i64) -> Result<(), CacheError> {
        self.check_write()?;
        let name = list_key(key);
        let mut sets = self.lock();
        if let Some(set) = sets.get_mut(&name) {
            set.entries.retain(|e| e.member_id != member_id);
            if set.entries.is_empty() {
                sets.remove(&name);
            }
        }
        Ok(())
    }

    async fn trim_to_cap(&self, key: &ListKey, cap: usize) -> Result<(), CacheError> {
        self.check_write()?;
        let name = list_key(key);
        let mut sets = self.lock();
        if let Some(set) = sets.get_mut(&name) {
            set.entries.truncate(cap);
            if set.entries.is_empty() {
                sets.remove(&name);
            }
        }
        Ok(())
    }

    async fn count(&self, key: &ListKey) -> Result<usize, CacheError> {
        self.check_read()?;
        Ok(self
            .lock()
            .get(&list_key(key))
            .map_or(0, |s| s.entries.len()))
    }

    async fn lowest(&self, key: &ListKey) -> Result<Option<CacheEntry>, CacheError> {
        self.check_read()?;
        Ok(self
            .lock()
            .get(&list_key(key))
            .and_then(|s| s.entries.last().copied()))
    }
}
