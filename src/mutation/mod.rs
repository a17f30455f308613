//! 写路径：先提交数据库事务，再尽力修补已预热的列表缓存
//!
//! 只有已经存在的缓存才会被修补，变更本身从不创建缓存。修补失败只记日志，
//! 缓存与数据库的差异由过期和下一次冷读修复。

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::models::{CacheEntry, rank_order};
use crate::cache::{CacheError, RankedListCache};
use crate::database::models::{ArticleStatus, NewArticle};
use crate::database::{ArticleStore, FollowStore};
use crate::error::AppError;
use crate::list::{ArticleSort, ListKey, ListSettings};

/// 发布文章的请求内容
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: String,
}

pub struct MutationCoordinator {
    articles: Arc<dyn ArticleStore>,
    follows: Arc<dyn FollowStore>,
    cache: Arc<dyn RankedListCache>,
    settings: ListSettings,
}

impl MutationCoordinator {
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        follows: Arc<dyn FollowStore>,
        cache: Arc<dyn RankedListCache>,
        settings: ListSettings,
    ) -> Self {
        Self {
            articles,
            follows,
            cache,
            settings,
        }
    }

    /// 发布文章，返回新文章 id
    pub async fn publish(&self, owner_id: i64, draft: ArticleDraft) -> Result<i64, AppError> {
        if owner_id <= 0 {
            return Err(AppError::validation("invalid author id"));
        }
        if draft.title.trim().is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }
        if draft.content.trim().is_empty() {
            return Err(AppError::validation("content must not be empty"));
        }

        let publish_time = Utc::now();
        let article_id = self
            .articles
            .insert(NewArticle {
                author_id: owner_id,
                title: draft.title,
                content: draft.content,
                description: draft.description,
                cover: draft.cover,
                publish_time,
            })
            .await?;
        info!(article_id, owner_id, "article published");

        // 新文章还没有点赞，点赞维度的分数为 0
        self.patch_add(
            &ListKey::articles(owner_id, ArticleSort::PublishTime),
            CacheEntry::new(article_id, publish_time.timestamp()),
        )
        .await;
        self.patch_add(
            &ListKey::articles(owner_id, ArticleSort::LikeCount),
            CacheEntry::new(article_id, 0),
        )
        .await;

        Ok(article_id)
    }

    /// 用户删除文章：只改状态，不物理删除
    pub async fn soft_delete(&self, owner_id: i64, article_id: i64) -> Result<(), AppError> {
        if owner_id <= 0 {
            return Err(AppError::validation("invalid author id"));
        }
        if article_id <= 0 {
            return Err(AppError::validation("invalid article id"));
        }

        let article = self
            .articles
            .find_one(article_id)
            .await?
            .ok_or(AppError::NotFound("article"))?;
        if article.author_id != owner_id {
            return Err(AppError::AccessDenied);
        }
        if article.status == ArticleStatus::UserDelete as i32 {
            return Ok(());
        }

        self.articles
            .update_status(article_id, ArticleStatus::UserDelete)
            .await?;
        info!(article_id, owner_id, "article deleted");

        for sort in [ArticleSort::PublishTime, ArticleSort::LikeCount] {
            self.patch_remove(&ListKey::articles(owner_id, sort), article_id)
                .await;
        }
        Ok(())
    }

    pub async fn follow(&self, user_id: i64, target_id: i64) -> Result<(), AppError> {
        validate_pair(user_id, target_id)?;

        let existing = self.follows.find_edge(user_id, target_id).await?;
        if existing.is_some_and(|edge| edge.is_following()) {
            debug!(user_id, target_id, "already following");
            return Ok(());
        }

        // 并发的另一次关注可能已经先提交，此时事务不做任何改动
        let Some(edge) = self.follows.follow(user_id, target_id).await? else {
            debug!(user_id, target_id, "follow raced with another request");
            return Ok(());
        };
        info!(user_id, target_id, "followed");

        let score = edge.score();
        self.patch_add(&ListKey::following(user_id), CacheEntry::new(target_id, score))
            .await;
        self.patch_add(&ListKey::fans(target_id), CacheEntry::new(user_id, score))
            .await;
        Ok(())
    }

    pub async fn unfollow(&self, user_id: i64, target_id: i64) -> Result<(), AppError> {
        validate_pair(user_id, target_id)?;

        match self.follows.find_edge(user_id, target_id).await? {
            Some(edge) if edge.is_following() => {}
            _ => {
                debug!(user_id, target_id, "not following, nothing to undo");
                return Ok(());
            }
        }

        if !self.follows.unfollow(user_id, target_id).await? {
            debug!(user_id, target_id, "unfollow raced with another request");
            return Ok(());
        }
        info!(user_id, target_id, "unfollowed");

        self.patch_remove(&ListKey::following(user_id), target_id)
            .await;
        self.patch_remove(&ListKey::fans(target_id), user_id).await;
        Ok(())
    }

    async fn patch_add(&self, key: &ListKey, entry: CacheEntry) {
        if let Err(e) = self.try_patch_add(key, entry).await {
            warn!(?key, member_id = entry.member_id, error = %e, "failed to add to list cache");
        }
    }

    async fn try_patch_add(&self, key: &ListKey, entry: CacheEntry) -> Result<(), CacheError> {
        if !self.cache.exists(key).await? {
            return Ok(());
        }

        // 没有结束标志位的缓存只是前缀，排在最后一条之后的成员不属于这个前缀
        let lowest = self.cache.lowest(key).await?;
        if lowest.is_some_and(|lowest| {
            !lowest.is_sentinel() && rank_order(&entry, &lowest) == Ordering::Greater
        }) {
            debug!(?key, member_id = entry.member_id, "ranks beyond cached prefix");
            return Ok(());
        }

        self.cache.add(key, entry).await?;
        self.cache.trim_to_cap(key, self.settings.max_cached).await?;
        // 缓存可能恰好在 exists 之后过期，补上有效期避免留下永不过期的键
        self.cache.touch_ttl(key, self.settings.cache_ttl).await
    }

    async fn patch_remove(&self, key: &ListKey, member_id: i64) {
        // 对不存在的键删除成员不会创建缓存
        if let Err(e) = self.cache.remove_member(key, member_id).await {
            warn!(?key, member_id, error = %e, "failed to remove from list cache");
        }
    }
}

fn validate_pair(user_id: i64, target_id: i64) -> Result<(), AppError> {
    if user_id <= 0 || target_id <= 0 {
        return Err(AppError::validation("invalid user id"));
    }
    if user_id == target_id {
        return Err(AppError::validation("cannot follow yourself"));
    }
    Ok(())
}
