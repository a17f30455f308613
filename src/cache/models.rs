use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// 列表结束标志位的成员 id
pub const SENTINEL_MEMBER: i64 = -1;

/// 结束标志位的分数，比任何真实分数都小
pub const SENTINEL_SCORE: i64 = -1;

/// 有序集合中的一个成员
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheEntry {
    pub member_id: i64,
    pub score: i64,
}

impl CacheEntry {
    pub fn new(member_id: i64, score: i64) -> Self {
        Self { member_id, score }
    }

    pub fn sentinel() -> Self {
        Self {
            member_id: SENTINEL_MEMBER,
            score: SENTINEL_SCORE,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.member_id == SENTINEL_MEMBER
    }
}

/// Redis 逆序排名的比较：分数降序，同分时成员按字符串降序
pub fn rank_order(a: &CacheEntry, b: &CacheEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.member_id.to_string().cmp(&a.member_id.to_string()))
}
