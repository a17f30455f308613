/// 缓存键模块
/// 提供各列表的 Redis 键生成函数
use crate::list::{ArticleSort, ListKey, ListKind};

/// 用户文章列表缓存键前缀
const ARTICLES_PREFIX: &str = "biz#articles#";

/// 关注列表缓存键前缀
const USER_FOLLOW_PREFIX: &str = "biz#user#follow#";

/// 粉丝列表缓存键前缀
const USER_FANS_PREFIX: &str = "biz#user#fans#";

/// 生成用户文章列表缓存键
pub fn articles_key(user_id: i64, sort: ArticleSort) -> String {
    format!("{}{}#{}", ARTICLES_PREFIX, user_id, sort.code())
}

/// 生成关注列表缓存键
pub fn user_follow_key(user_id: i64) -> String {
    format!("{}{}", USER_FOLLOW_PREFIX, user_id)
}

/// 生成粉丝列表缓存键
pub fn user_fans_key(user_id: i64) -> String {
    format!("{}{}", USER_FANS_PREFIX, user_id)
}

pub fn list_key(key: &ListKey) -> String {
    match key.kind {
        ListKind::Articles(sort) => articles_key(key.owner_id, sort),
        ListKind::Following => user_follow_key(key.owner_id),
        ListKind::Fans => user_fans_key(key.owner_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_per_kind() {
        assert_eq!(
            list_key(&ListKey::articles(7, ArticleSort::PublishTime)),
            "biz#articles#7#0"
        );
        assert_eq!(
            list_key(&ListKey::articles(7, ArticleSort::LikeCount)),
            "biz#articles#7#1"
        );
        assert_eq!(list_key(&ListKey::following(7)), "biz#user#follow#7");
        assert_eq!(list_key(&ListKey::fans(7)), "biz#user#fans#7");
    }
}
