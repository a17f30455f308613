// 关注关系实体
// 定义关注表和关注计数表的数据库实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 关注状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(i32)]
pub enum FollowStatus {
    Follow = 1,
    Unfollow = 2,
}

/// 关注关系，对应数据库中的 follow 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FollowEntity {
    pub id: i64,
    pub user_id: i64,
    pub followed_user_id: i64,
    pub follow_status: i32,
    pub create_time: DateTime<Utc>,
    /// 最近一次状态变化的时间，关注列表按它排序
    pub update_time: DateTime<Utc>,
}

impl FollowEntity {
    pub fn is_following(&self) -> bool {
        self.follow_status == FollowStatus::Follow as i32
    }

    /// 关注列表、粉丝列表中的分数
    pub fn score(&self) -> i64 {
        self.update_time.timestamp()
    }
}

/// 用户的关注数和粉丝数，对应 follow_count 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FollowCountEntity {
    pub user_id: i64,
    pub follow_count: i64,
    pub fans_count: i64,
}
