//! 游标分页的排序列表子系统
//!
//! 文章列表、关注列表、粉丝列表共用同一套读路径：先查 Redis 有序集合，
//! 命中则直接组装分页；未命中则回源数据库，组装分页后在后台预热缓存。

pub mod cold;
pub mod hydrate;
pub mod page;
pub mod reader;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::models::CacheEntry;
use crate::database::StoreError;
use crate::error::AppError;

pub use cold::ColdPathLoader;
pub use hydrate::HydrationLoader;
pub use page::{PageAssembler, PageSlice, PageWindow};
pub use reader::RankedListReader;

/// 文章排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArticleSort {
    PublishTime,
    LikeCount,
}

impl ArticleSort {
    pub fn code(self) -> i32 {
        match self {
            ArticleSort::PublishTime => 0,
            ArticleSort::LikeCount => 1,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, AppError> {
        match code {
            0 => Ok(ArticleSort::PublishTime),
            1 => Ok(ArticleSort::LikeCount),
            other => Err(AppError::validation(format!("unsupported sort type: {other}"))),
        }
    }
}

/// 列表种类，决定缓存键和回源查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Articles(ArticleSort),
    Following,
    Fans,
}

/// 一个缓存列表的标识：(所属用户, 排序维度)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub owner_id: i64,
    pub kind: ListKind,
}

impl ListKey {
    pub fn articles(owner_id: i64, sort: ArticleSort) -> Self {
        Self {
            owner_id,
            kind: ListKind::Articles(sort),
        }
    }

    pub fn following(owner_id: i64) -> Self {
        Self {
            owner_id,
            kind: ListKind::Following,
        }
    }

    pub fn fans(owner_id: i64) -> Self {
        Self {
            owner_id,
            kind: ListKind::Fans,
        }
    }
}

/// 一页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub is_end: bool,
    pub next_cursor: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            is_end: self.is_end,
            next_cursor: self.next_cursor,
        }
    }
}

/// 分页请求参数，page_size 为 0 时使用默认值
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub cursor: i64,
    #[serde(default)]
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(cursor: i64, page_size: i64) -> Self {
        Self { cursor, page_size }
    }
}

#[derive(Debug, Clone)]
pub struct ListSettings {
    /// 列表缓存有效期，每次读取都会续期
    pub cache_ttl: Duration,
    /// 每个列表最多保留的缓存条目数
    pub max_cached: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
    /// 回填详情时的最大并发
    pub hydration_concurrency: usize,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600 * 24 * 2),
            max_cached: 300,
            default_page_size: 10,
            max_page_size: 100,
            hydration_concurrency: 16,
        }
    }
}

/// 列表的数据来源：数据库回源查询 + 按 id 回填详情
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// 按排序维度降序查询 [offset, offset + limit) 区间
    async fn window(
        &self,
        key: &ListKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self::Item>, StoreError>;

    /// 按缓存中的 id 顺序回填完整记录，结果顺序必须与 ids 一致
    async fn hydrate(&self, key: &ListKey, ids: &[i64]) -> Result<Vec<Self::Item>, StoreError>;

    /// 记录在给定列表中的成员 id 和分数
    fn entry_of(&self, key: &ListKey, item: &Self::Item) -> CacheEntry;
}
