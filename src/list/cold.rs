// 冷读
// 缓存未命中时回源数据库，组装当前页，并在后台预热缓存

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::models::CacheEntry;
use crate::cache::{CacheError, RankedListCache};
use crate::error::AppError;
use crate::list::page::{PageAssembler, PageWindow};
use crate::list::{ListKey, ListSettings, ListSource, Page};

pub struct ColdPathLoader {
    cache: Arc<dyn RankedListCache>,
    assembler: PageAssembler,
    settings: ListSettings,
}

impl ColdPathLoader {
    pub fn new(cache: Arc<dyn RankedListCache>, settings: ListSettings) -> Self {
        Self {
            cache,
            assembler: PageAssembler::new(&settings),
            settings,
        }
    }

    /// 多取一行判断是否到底，不足一个窗口时补上结束标志位
    ///
    /// 取回的窗口在后台写入缓存，失败只记日志，不影响已经组装好的这一页。
    pub async fn load<S: ListSource>(
        &self,
        source: &S,
        key: &ListKey,
        window: &PageWindow,
    ) -> Result<Page<S::Item>, AppError> {
        let rows = source.window(key, window.offset(), window.limit()).await?;
        let entries: Vec<CacheEntry> = rows.iter().map(|row| source.entry_of(key, row)).collect();
        let entries = self.assembler.seal(window, entries);
        let slice = self.assembler.assemble(window, &entries);

        debug!(
            ?key,
            cursor = window.cursor,
            rows = rows.len(),
            is_end = slice.is_end,
            "list served from store"
        );

        self.spawn_warm_up(*key, window.cursor, entries);

        let items = rows.into_iter().take(slice.ids.len()).collect();
        Ok(slice.into_page(items))
    }

    fn spawn_warm_up(&self, key: ListKey, cursor: i64, entries: Vec<CacheEntry>) {
        let cache = self.cache.clone();
        let ttl = self.settings.cache_ttl;
        let cap = self.settings.max_cached;

        tokio::spawn(async move {
            match warm_up(cache.as_ref(), &key, cursor, &entries, ttl, cap).await {
                Ok(true) => debug!(?key, cursor, entries = entries.len(), "list cache warmed"),
                Ok(false) => debug!(?key, cursor, "window does not continue cached prefix"),
                Err(e) => warn!(?key, cursor, error = %e, "failed to warm list cache"),
            }
        });
    }
}

/// 把冷读取回的窗口写入缓存，返回是否写入
///
/// 游标 0 的窗口就是列表前缀，总是写入。之后的窗口只能接在已有前缀的后面：
/// 缓存没有结束标志位，并且成员数不少于游标，否则写入会在缓存中留下空洞。
async fn warm_up(
    cache: &dyn RankedListCache,
    key: &ListKey,
    cursor: i64,
    entries: &[CacheEntry],
    ttl: Duration,
    cap: usize,
) -> Result<bool, CacheError> {
    if cursor > 0 {
        if (cache.count(key).await? as i64) < cursor {
            return Ok(false);
        }
        if cache.lowest(key).await?.is_some_and(|e| e.is_sentinel()) {
            return Ok(false);
        }
    }
    cache.warm(key, entries, ttl, cap).await?;
    Ok(true)
}
