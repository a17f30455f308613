// 文章服务
// 作者文章列表（按发布时间或点赞数）和文章详情

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::RankedListCache;
use crate::cache::models::CacheEntry;
use crate::database::models::ArticleEntity;
use crate::database::{ArticleStore, StoreError};
use crate::error::AppError;
use crate::list::{
    ArticleSort, HydrationLoader, ListKey, ListKind, ListSettings, ListSource, Page, PageRequest,
    RankedListReader,
};

/// 文章列表的数据来源
pub struct ArticleListSource {
    store: Arc<dyn ArticleStore>,
    loader: HydrationLoader,
}

impl ArticleListSource {
    pub fn new(store: Arc<dyn ArticleStore>, loader: HydrationLoader) -> Self {
        Self { store, loader }
    }
}

fn sort_of(key: &ListKey) -> Result<ArticleSort, StoreError> {
    match key.kind {
        ListKind::Articles(sort) => Ok(sort),
        other => Err(StoreError::Unavailable(format!(
            "{other:?} is not an article list"
        ))),
    }
}

#[async_trait]
impl ListSource for ArticleListSource {
    type Item = ArticleEntity;

    async fn window(
        &self,
        key: &ListKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ArticleEntity>, StoreError> {
        let sort = sort_of(key)?;
        self.store
            .list_by_author(key.owner_id, sort, offset, limit)
            .await
    }

    /// 逐篇回填，已删除或不存在的文章被过滤掉
    async fn hydrate(&self, _key: &ListKey, ids: &[i64]) -> Result<Vec<ArticleEntity>, StoreError> {
        let articles = self
            .loader
            .load(ids, |id| self.store.find_one(id))
            .await?;

        Ok(articles
            .into_iter()
            .flatten()
            .filter(ArticleEntity::is_visible)
            .collect())
    }

    fn entry_of(&self, key: &ListKey, item: &ArticleEntity) -> CacheEntry {
        let sort = match key.kind {
            ListKind::Articles(sort) => sort,
            _ => ArticleSort::PublishTime,
        };
        CacheEntry::new(item.id, item.score(sort))
    }
}

pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
    reader: RankedListReader<ArticleListSource>,
}

impl ArticleService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        cache: Arc<dyn RankedListCache>,
        settings: ListSettings,
    ) -> Self {
        let source = ArticleListSource::new(
            store.clone(),
            HydrationLoader::new(settings.hydration_concurrency),
        );
        Self {
            store,
            reader: RankedListReader::new(Arc::new(source), cache, settings),
        }
    }

    /// 作者的文章列表
    pub async fn articles(
        &self,
        author_id: i64,
        sort: ArticleSort,
        request: PageRequest,
    ) -> Result<Page<ArticleEntity>, AppError> {
        if author_id <= 0 {
            return Err(AppError::validation("invalid author id"));
        }
        self.reader
            .page(&ListKey::articles(author_id, sort), request)
            .await
    }

    /// 文章详情，不存在或不可见时返回 None
    pub async fn article_detail(&self, article_id: i64) -> Result<Option<ArticleEntity>, AppError> {
        if article_id <= 0 {
            return Err(AppError::validation("invalid article id"));
        }
        let article = self.store.find_one(article_id).await?;
        Ok(article.filter(ArticleEntity::is_visible))
    }
}
