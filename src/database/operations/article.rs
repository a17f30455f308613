// 文章存储
// 包含文章相关的数据库操作

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::ArticleStore;
use crate::database::StoreError;
use crate::database::models::{ArticleEntity, ArticleStatus, NewArticle};
use crate::list::ArticleSort;

const ARTICLE_COLUMNS: &str = "id, title, content, cover, description, author_id, status, \
     comment_num, like_num, publish_time, create_time, update_time";

/// 文章存储库，处理所有与文章相关的数据库操作
pub struct ArticleOperation {
    db: Arc<PgPool>,
}

impl ArticleOperation {
    /// 创建新的文章存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

/// 排序字段不能作为绑定参数传入，按排序方式选择固定的语句
///
/// 缓存分数是秒级时间戳或点赞数，同分时 Redis 按成员字符串降序排列，
/// 这里的排序与之保持一致，冷读和缓存读才能得到同一个顺序。
fn list_by_author_sql(sort: ArticleSort) -> String {
    let order_by = match sort {
        ArticleSort::PublishTime => {
            "date_trunc('second', publish_time) DESC, id::text COLLATE \"C\" DESC"
        }
        ArticleSort::LikeCount => "like_num DESC, id::text COLLATE \"C\" DESC",
    };
    format!(
        "SELECT {ARTICLE_COLUMNS} FROM article \
         WHERE author_id = $1 AND status = $2 \
         ORDER BY {order_by} OFFSET $3 LIMIT $4"
    )
}

#[async_trait]
impl ArticleStore for ArticleOperation {
    async fn insert(&self, article: NewArticle) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO article (
                title, content, description, cover, author_id, status,
                comment_num, like_num, publish_time, create_time, update_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.description)
        .bind(&article.cover)
        .bind(article.author_id)
        .bind(ArticleStatus::Visible as i32)
        .bind(article.publish_time)
        .fetch_one(&*self.db)
        .await?;

        Ok(id)
    }

    async fn find_one(&self, id: i64) -> Result<Option<ArticleEntity>, StoreError> {
        let article = sqlx::query_as::<_, ArticleEntity>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM article WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(article)
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        sort: ArticleSort,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ArticleEntity>, StoreError> {
        let articles = sqlx::query_as::<_, ArticleEntity>(&list_by_author_sql(sort))
            .bind(author_id)
            .bind(ArticleStatus::Visible as i32)
            .bind(offset)
            .bind(limit)
            .fetch_all(&*self.db)
            .await?;

        Ok(articles)
    }

    async fn update_status(&self, id: i64, status: ArticleStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE article SET status = $1, update_time = NOW() WHERE id = $2")
            .bind(status as i32)
            .bind(id)
            .execute(&*self.db)
            .await?;

        Ok(())
    }
}
