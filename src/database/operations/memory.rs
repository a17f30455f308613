// 内存存储
// 文章和关注存储的进程内实现，排序和事务语义与 Postgres 实现一致

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ArticleStore, FollowStore};
use crate::cache::models::{CacheEntry, rank_order};
use crate::database::StoreError;
use crate::database::models::{
    ArticleEntity, ArticleStatus, FollowCountEntity, FollowEntity, FollowStatus, NewArticle,
};
use crate::list::ArticleSort;

#[derive(Default)]
struct State {
    articles: BTreeMap<i64, ArticleEntity>,
    next_article_id: i64,
    follows: Vec<FollowEntity>,
    next_follow_id: i64,
    counts: HashMap<i64, FollowCountEntity>,
}

impl State {
    fn count_mut(&mut self, user_id: i64) -> &mut FollowCountEntity {
        self.counts
            .entry(user_id)
            .or_insert_with(|| FollowCountEntity {
                user_id,
                follow_count: 0,
                fans_count: 0,
            })
    }
}

/// 按 (分数, 成员) 排序后分页
fn ranked_page<T: Clone>(
    mut rows: Vec<(CacheEntry, T)>,
    offset: i64,
    limit: i64,
) -> Vec<T> {
    rows.sort_by(|(a, _), (b, _)| rank_order(a, b));
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .map(|(_, row)| row)
        .collect()
}

/// 进程内存储，实现 [`ArticleStore`] 和 [`FollowStore`]
///
/// 除了存储本身，还提供测试需要的钩子：读写故障注入、
/// 按文章 id 注入查询延迟，以及回源查询次数统计。
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_articles: Mutex<HashSet<i64>>,
    find_latency: Mutex<HashMap<i64, Duration>>,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入一篇文章，id 由调用方指定
    pub fn seed_article(&self, article: ArticleEntity) {
        let mut state = self.lock();
        state.next_article_id = state.next_article_id.max(article.id);
        state.articles.insert(article.id, article);
    }

    /// 直接写入一条关注关系，不改动计数
    pub fn seed_follow(&self, user_id: i64, followed_user_id: i64, at: DateTime<Utc>) {
        let mut state = self.lock();
        state.next_follow_id += 1;
        let id = state.next_follow_id;
        state.follows.push(FollowEntity {
            id,
            user_id,
            followed_user_id,
            follow_status: FollowStatus::Follow as i32,
            create_time: at,
            update_time: at,
        });
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 查询这篇文章时返回错误
    pub fn fail_article(&self, id: i64) {
        lock(&self.failing_articles).insert(id);
    }

    pub fn set_find_latency(&self, id: i64, latency: Duration) {
        lock(&self.find_latency).insert(id, latency);
    }

    /// 列表回源查询次数
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn follow_count(&self, user_id: i64) -> Option<FollowCountEntity> {
        self.lock().counts.get(&user_id).cloned()
    }

    pub fn article(&self, id: i64) -> Option<ArticleEntity> {
        self.lock().articles.get(&id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        lock(&self.state)
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert(&self, article: NewArticle) -> Result<i64, StoreError> {
        self.check_write()?;
        let mut state = self.lock();
        state.next_article_id += 1;
        let id = state.next_article_id;
        let now = Utc::now();
        state.articles.insert(
            id,
            ArticleEntity {
                id,
                title: article.title,
                content: article.content,
                cover: article.cover,
                description: article.description,
                author_id: article.author_id,
                status: ArticleStatus::Visible as i32,
                comment_num: 0,
                like_num: 0,
                publish_time: article.publish_time,
                create_time: now,
                update_time: now,
            },
        );
        Ok(id)
    }

    async fn find_one(&self, id: i64) -> Result<Option<ArticleEntity>, StoreError> {
        self.check_read()?;
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        let latency = lock(&self.find_latency).get(&id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if lock(&self.failing_articles).contains(&id) {
            return Err(StoreError::Unavailable(format!("article {id} unavailable")));
        }
        Ok(self.lock().articles.get(&id).cloned())
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        sort: ArticleSort,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ArticleEntity>, StoreError> {
        self.check_read()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self
            .lock()
            .articles
            .values()
            .filter(|a| a.author_id == author_id && a.is_visible())
            .map(|a| (CacheEntry::new(a.id, a.score(sort)), a.clone()))
            .collect();
        Ok(ranked_page(rows, offset, limit))
    }

    async fn update_status(&self, id: i64, status: ArticleStatus) -> Result<(), StoreError> {
        self.check_write()?;
        if let Some(article) = self.lock().articles.get_mut(&id) {
            article.status = status as i32;
            article.update_time = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl FollowStore for MemoryStore {
    async fn find_edge(
        &self,
        user_id: i64,
        followed_user_id: i64,
    ) -> Result<Option<FollowEntity>, StoreError> {
        self.check_read()?;
        Ok(self
            .lock()
            .follows
            .iter()
            .find(|f| f.user_id == user_id && f.followed_user_id == followed_user_id)
            .cloned())
    }

    async fn follow(
        &self,
        user_id: i64,
        followed_user_id: i64,
    ) -> Result<Option<FollowEntity>, StoreError> {
        self.check_write()?;
        // 整个修改在一把锁内完成，相当于一个事务
        let mut state = self.lock();
        let now = Utc::now();
        let existing = state
            .follows
            .iter_mut()
            .find(|f| f.user_id == user_id && f.followed_user_id == followed_user_id);
        let edge = match existing {
            Some(edge) if edge.is_following() => return Ok(None),
            Some(edge) => {
                edge.follow_status = FollowStatus::Follow as i32;
                edge.update_time = now;
                edge.clone()
            }
            None => {
                state.next_follow_id += 1;
                let edge = FollowEntity {
                    id: state.next_follow_id,
                    user_id,
                    followed_user_id,
                    follow_status: FollowStatus::Follow as i32,
                    create_time: now,
                    update_time: now,
                };
                state.follows.push(edge.clone());
                edge
            }
        };
        state.count_mut(user_id).follow_count += 1;
        state.count_mut(followed_user_id).fans_count += 1;
        Ok(Some(edge))
    }

    async fn unfollow(&self, user_id: i64, followed_user_id: i64) -> Result<bool, StoreError> {
        self.check_write()?;
        let mut state = self.lock();
        let Some(edge) = state.follows.iter_mut().find(|f| {
            f.user_id == user_id && f.followed_user_id == followed_user_id && f.is_following()
        }) else {
            return Ok(false);
        };
        edge.follow_status = FollowStatus::Unfollow as i32;
        edge.update_time = Utc::now();

        let follower = state.count_mut(user_id);
        follower.follow_count = (follower.follow_count - 1).max(0);
        let target = state.count_mut(followed_user_id);
        target.fans_count = (target.fans_count - 1).max(0);
        Ok(true)
    }

    async fn following_page(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowEntity>, StoreError> {
        self.check_read()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self
            .lock()
            .follows
            .iter()
            .filter(|f| f.user_id == user_id && f.is_following())
            .map(|f| (CacheEntry::new(f.followed_user_id, f.score()), f.clone()))
            .collect();
        Ok(ranked_page(rows, offset, limit))
    }

    async fn fans_page(
        &self,
        followed_user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowEntity>, StoreError> {
        self.check_read()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self
            .lock()
            .follows
            .iter()
            .filter(|f| f.followed_user_id == followed_user_id && f.is_following())
            .map(|f| (CacheEntry::new(f.user_id, f.score()), f.clone()))
            .collect();
        Ok(ranked_page(rows, offset, limit))
    }

    async fn following_edges(
        &self,
        user_id: i64,
        followed_user_ids: &[i64],
    ) -> Result<Vec<FollowEntity>, StoreError> {
        self.check_read()?;
        Ok(self
            .lock()
            .follows
            .iter()
            .filter(|f| {
                f.user_id == user_id
                    && f.is_following()
                    && followed_user_ids.contains(&f.followed_user_id)
            })
            .cloned()
            .collect())
    }

    async fn fans_edges(
        &self,
        followed_user_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<FollowEntity>, StoreError> {
        self.check_read()?;
        Ok(self
            .lock()
            .follows
            .iter()
            .filter(|f| {
                f.followed_user_id == followed_user_id
                    && f.is_following()
                    && user_ids.contains(&f.user_id)
            })
            .cloned()
            .collect())
    }

    async fn counts_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<FollowCountEntity>, StoreError> {
        self.check_read()?;
        let state = self.lock();
        Ok(user_ids
            .iter()
            .filter_map(|id| state.counts.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(id: i64, author_id: i64, likes: i64, ts: i64) -> ArticleEntity {
        let at = Utc.timestamp_opt(ts, 0).unwrap();
        ArticleEntity {
            id,
            title: format!("title {id}"),
            content: "content".into(),
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

    #[tokio::test]
    async fn list_by_author_orders_and_filters() {
        let store = MemoryStore::new();
        store.seed_article(article(1, 9, 5, 100));
        store.seed_article(article(2, 9, 50, 300));
        store.seed_article(article(3, 9, 20, 200));
        store.seed_article(article(4, 8, 99, 999));
        let mut hidden = article(5, 9, 1000, 1000);
        hidden.status = ArticleStatus::UserDelete as i32;
        store.seed_article(hidden);

        let by_time = store
            .list_by_author(9, ArticleSort::PublishTime, 0, 10)
            .await
            .unwrap();
        let ids: Vec<i64> = by_time.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let by_likes = store
            .list_by_author(9, ArticleSort::LikeCount, 1, 1)
            .await
            .unwrap();
        assert_eq!(by_likes[0].id, 3);
    }

    #[tokio::test]
    async fn follow_is_idempotent_in_the_transaction() {
        let store = MemoryStore::new();
        assert!(store.follow(1, 2).await.unwrap().is_some());
        assert!(store.follow(1, 2).await.unwrap().is_none());

        assert_eq!(store.follow_count(1).unwrap().follow_count, 1);
        assert_eq!(store.follow_count(2).unwrap().fans_count, 1);

        assert!(store.unfollow(1, 2).await.unwrap());
        assert!(!store.unfollow(1, 2).await.unwrap());
        assert_eq!(store.follow_count(1).unwrap().follow_count, 0);
        assert_eq!(store.follow_count(2).unwrap().fans_count, 0);
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_after_seeds() {
        let store = MemoryStore::new();
        store.seed_article(article(10, 1, 0, 1));
        let id = store
            .insert(NewArticle {
                author_id: 1,
                title: "t".into(),
                content: "c".into(),
                description: String::new(),
                cover: String::new(),
                publish_time: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(id, 11);
        assert!(store.article(11).unwrap().is_visible());
    }
}
