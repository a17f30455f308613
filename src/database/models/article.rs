// 文章实体
// 定义文章相关的数据库实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::list::ArticleSort;

/// 文章状态枚举
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(i32)]
pub enum ArticleStatus {
    /// 待审核
    Pending = 0,
    /// 审核不通过
    NotPass = 1,
    /// 可见
    Visible = 2,
    /// 用户删除
    UserDelete = 3,
}

/// 文章实体，对应数据库中的 article 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ArticleEntity {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub cover: String,
    pub description: String,
    pub author_id: i64,
    pub status: i32,
    pub comment_num: i64,
    pub like_num: i64,
    pub publish_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl ArticleEntity {
    /// 只有可见状态的文章参与列表
    pub fn is_visible(&self) -> bool {
        self.status == ArticleStatus::Visible as i32
    }

    /// 文章在列表中的分数：发布时间戳或点赞数
    pub fn score(&self, sort: ArticleSort) -> i64 {
        match sort {
            ArticleSort::PublishTime => self.publish_time.timestamp(),
            ArticleSort::LikeCount => self.like_num,
        }
    }
}

/// 新文章的写入参数
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub description: String,
    pub cover: String,
    pub publish_time: DateTime<Utc>,
}
