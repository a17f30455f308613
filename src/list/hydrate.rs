// 详情回填
// 按缓存中的 id 顺序并发查询完整记录

use std::future::Future;

use futures_util::{StreamExt, TryStreamExt, stream};

/// 有界并发的按 id 回填
///
/// 结果写入按下标预分配的槽位，返回顺序与输入 id 顺序一致，和查询完成的先后无关。
/// 任一查询失败即返回该错误，尚未完成的查询随流一起被丢弃。
#[derive(Debug, Clone, Copy)]
pub struct HydrationLoader {
    concurrency: usize,
}

impl HydrationLoader {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub async fn load<T, E, F, Fut>(&self, ids: &[i64], fetch: F) -> Result<Vec<T>, E>
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut slots: Vec<Option<T>> = ids.iter().map(|_| None).collect();
        let mut fetches = stream::iter(ids.iter().copied().enumerate())
            .map(|(index, id)| {
                let fetched = fetch(id);
                async move { fetched.await.map(|record| (index, record)) }
            })
            .buffer_unordered(self.concurrency);

        while let Some((index, record)) = fetches.try_next().await? {
            slots[index] = Some(record);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
