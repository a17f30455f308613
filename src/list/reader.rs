// 列表读取
// 缓存优先的分页读取：命中时从有序集合取窗口并回填详情，未命中时走冷读

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::RankedListCache;
use crate::cache::models::SENTINEL_SCORE;
use crate::error::AppError;
use crate::list::cold::ColdPathLoader;
use crate::list::page::PageAssembler;
use crate::list::{ListKey, ListSettings, ListSource, Page, PageRequest};

/// 某一类排序列表的读取入口
///
/// 缓存读失败（`exists`、`range_desc`）直接返回错误，不会越过缓存回源，
/// 续期失败只记日志。
pub struct RankedListReader<S: ListSource> {
    source: Arc<S>,
    cache: Arc<dyn RankedListCache>,
    assembler: PageAssembler,
    cold: ColdPathLoader,
    settings: ListSettings,
}

impl<S: ListSource> RankedListReader<S> {
    pub fn new(source: Arc<S>, cache: Arc<dyn RankedListCache>, settings: ListSettings) -> Self {
        Self {
            assembler: PageAssembler::new(&settings),
            cold: ColdPathLoader::new(cache.clone(), settings.clone()),
            source,
            cache,
            settings,
        }
    }

    pub async fn page(&self, key: &ListKey, request: PageRequest) -> Result<Page<S::Item>, AppError> {
        let window = self.assembler.window(request)?;

        if self.cache.exists(key).await? {
            if let Err(e) = self.cache.touch_ttl(key, self.settings.cache_ttl).await {
                warn!(?key, error = %e, "failed to refresh list cache ttl");
            }

            let entries = self
                .cache
                .range_desc(
                    key,
                    SENTINEL_SCORE,
                    i64::MAX,
                    window.offset() as usize,
                    window.limit() as usize,
                )
                .await?;

            if self.assembler.covers(&window, &entries) {
                let slice = self.assembler.assemble(&window, &entries);
                debug!(?key, cursor = window.cursor, hits = slice.ids.len(), "list cache hit");

                let items = if slice.ids.is_empty() {
                    Vec::new()
                } else {
                    self.source.hydrate(key, &slice.ids).await?
                };
                return Ok(slice.into_page(items));
            }

            debug!(?key, cursor = window.cursor, "cached prefix ends before window");
        } else {
            debug!(?key, cursor = window.cursor, "list cache miss");
        }

        self.cold.load(self.source.as_ref(), key, &window).await
    }
}
