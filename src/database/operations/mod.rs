// 数据库操作
// 存储接口以及 Postgres、内存两种实现

pub mod article;
pub mod follow;
pub mod memory;

use async_trait::async_trait;

use super::StoreError;
use super::models::{ArticleEntity, ArticleStatus, FollowCountEntity, FollowEntity, NewArticle};
use crate::list::ArticleSort;

pub use article::ArticleOperation;
pub use follow::FollowOperation;
pub use memory::MemoryStore;

/// 文章存储
#[async_trait]
pub trait ArticleStore: Send + Sync + 'static {
    /// 写入文章，返回生成的 id
    async fn insert(&self, article: NewArticle) -> Result<i64, StoreError>;

    async fn find_one(&self, id: i64) -> Result<Option<ArticleEntity>, StoreError>;

    /// 作者的可见文章，按排序字段降序分页
    async fn list_by_author(
        &self,
        author_id: i64,
        sort: ArticleSort,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ArticleEntity>, StoreError>;

    async fn update_status(&self, id: i64, status: ArticleStatus) -> Result<(), StoreError>;
}

/// 关注关系和关注计数存储
#[async_trait]
pub trait FollowStore: Send + Sync + 'static {
    async fn find_edge(
        &self,
        user_id: i64,
        followed_user_id: i64,
    ) -> Result<Option<FollowEntity>, StoreError>;

    /// 在一个事务里把关系置为关注，并给双方计数加一，返回更新后的关系
    ///
    /// 关系在事务内已是关注状态时不改动任何数据，返回 None。
    async fn follow(
        &self,
        user_id: i64,
        followed_user_id: i64,
    ) -> Result<Option<FollowEntity>, StoreError>;

    /// 在一个事务里把关系置为取消关注，并给双方计数减一
    ///
    /// 关系不存在或已取消时不改动任何数据，返回 false。
    async fn unfollow(&self, user_id: i64, followed_user_id: i64) -> Result<bool, StoreError>;

    /// user_id 关注的人，按关注时间降序
    async fn following_page(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowEntity>, StoreError>;

    /// 关注 followed_user_id 的人，按关注时间降序
    async fn fans_page(
        &self,
        followed_user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FollowEntity>, StoreError>;

    /// user_id 对给定用户们的关注关系（仅关注状态）
    async fn following_edges(
        &self,
        user_id: i64,
        followed_user_ids: &[i64],
    ) -> Result<Vec<FollowEntity>, StoreError>;

    /// 给定用户们对 followed_user_id 的关注关系（仅关注状态）
    async fn fans_edges(
        &self,
        followed_user_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<FollowEntity>, StoreError>;

    /// 批量查询关注数和粉丝数，没有计数行的用户不返回
    async fn counts_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<FollowCountEntity>, StoreError>;
}
