use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::ArticleEntity;

#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    pub author_id: i64,
    /// 0 按发布时间，1 按点赞数
    #[serde(default)]
    pub sort_type: i32,
    #[serde(default)]
    pub cursor: i64,
    #[serde(default)]
    pub page_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteArticleRequest {
    pub article_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    pub article_id: i64,
}

/// 列表中的文章，不含正文
#[derive(Debug, Serialize)]
pub struct ArticleItem {
    pub article_id: i64,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub author_id: i64,
    pub like_num: i64,
    pub comment_num: i64,
    pub publish_time: DateTime<Utc>,
}

impl From<ArticleEntity> for ArticleItem {
    fn from(article: ArticleEntity) -> Self {
        Self {
            article_id: article.id,
            title: article.title,
            description: article.description,
            cover: article.cover,
            author_id: article.author_id,
            like_num: article.like_num,
            comment_num: article.comment_num,
            publish_time: article.publish_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    pub article_id: i64,
    pub title: String,
    pub content: String,
    pub description: String,
    pub cover: String,
    pub author_id: i64,
    pub like_num: i64,
    pub comment_num: i64,
    pub publish_time: DateTime<Utc>,
}

impl From<ArticleEntity> for ArticleDetail {
    fn from(article: ArticleEntity) -> Self {
        Self {
            article_id: article.id,
            title: article.title,
            content: article.content,
            description: article.description,
            cover: article.cover,
            author_id: article.author_id,
            like_num: article.like_num,
            comment_num: article.comment_num,
            publish_time: article.publish_time,
        }
    }
}
