mod common;

use beyond::cache::CacheEntry;
use beyond::list::{ArticleSort, ListKey, ListSettings, PageRequest};
use beyond::mutation::ArticleDraft;

use common::{article, harness, harness_with, wait_for_cache};

fn draft(title: &str) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        content: "body".to_string(),
        description: String::new(),
        cover: String::new(),
    }
}

#[tokio::test]
async fn follow_twice_changes_counters_once() {
    let h = harness();

    h.state.mutations.follow(1, 2).await.unwrap();
    h.state.mutations.follow(1, 2).await.unwrap();

    let follower = h.store.follow_count(1).unwrap();
    let target = h.store.follow_count(2).unwrap();
    assert_eq!(follower.follow_count, 1);
    assert_eq!(follower.fans_count, 0);
    assert_eq!(target.fans_count, 1);
    assert_eq!(target.follow_count, 0);
}

#[tokio::test]
async fn concurrent_follows_change_counters_once() {
    let h = harness();
    let (a, b) = tokio::join!(
        h.state.mutations.follow(3, 4),
        h.state.mutations.follow(3, 4)
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(h.store.follow_count(3).unwrap().follow_count, 1);
    assert_eq!(h.store.follow_count(4).unwrap().fans_count, 1);
}

#[tokio::test]
async fn unfollow_without_follow_is_a_no_op() {
    let h = harness();

    h.state.mutations.unfollow(1, 2).await.unwrap();

    assert!(h.store.follow_count(1).is_none());
    assert!(h.store.follow_count(2).is_none());
}

#[tokio::test]
async fn follow_then_unfollow_restores_counters() {
    let h = harness();
    h.state.mutations.follow(1, 2).await.unwrap();
    h.state.mutations.unfollow(1, 2).await.unwrap();
    h.state.mutations.unfollow(1, 2).await.unwrap();

    assert_eq!(h.store.follow_count(1).unwrap().follow_count, 0);
    assert_eq!(h.store.follow_count(2).unwrap().fans_count, 0);

    // 再次关注会复用原来的关系
    h.state.mutations.follow(1, 2).await.unwrap();
    assert_eq!(h.store.follow_count(2).unwrap().fans_count, 1);
}

#[tokio::test]
async fn publish_into_warm_list_is_served_without_store_query() {
    let h = harness();
    for id in 1..=5 {
        h.store.seed_article(article(id, 1, 1_000 + id, id));
    }
    let key = ListKey::articles(1, ArticleSort::PublishTime);
    h.state
        .articles
        .articles(1, ArticleSort::PublishTime, PageRequest::new(0, 3))
        .await
        .unwrap();
    wait_for_cache(&h.cache, &key).await;

    let new_id = h.state.mutations.publish(1, draft("fresh")).await.unwrap();
    let list_calls = h.store.list_calls();

    let page = h
        .state
        .articles
        .articles(1, ArticleSort::PublishTime, PageRequest::new(0, 3))
        .await
        .unwrap();
    let ids: Vec<i64> = page.items.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![new_id, 5, 4]);
    assert_eq!(h.store.list_calls(), list_calls);
}

#[tokio::test]
async fn publish_to_cold_owner_leaves_cache_untouched() {
    let h = harness();

    let id = h.state.mutations.publish(1, draft("first")).await.unwrap();

    for sort in [ArticleSort::PublishTime, ArticleSort::LikeCount] {
        assert!(h.cache.snapshot(&ListKey::articles(1, sort)).is_none());
    }

    // 第一次读取走数据库
    let page = h
        .state
        .articles
        .articles(1, ArticleSort::PublishTime, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].id, id);
    assert_eq!(h.store.list_calls(), 1);
}

#[tokio::test]
async fn soft_delete_removes_from_every_warm_list() {
    let h = harness();
    for id in 1..=4 {
        h.store.seed_article(article(id, 1, 1_000 + id, 10 - id));
    }
    for sort in [ArticleSort::PublishTime, ArticleSort::LikeCount] {
        h.state
            .articles
            .articles(1, sort, PageRequest::default())
            .await
            .unwrap();
        wait_for_cache(&h.cache, &ListKey::articles(1, sort)).await;
    }

    h.state.mutations.soft_delete(1, 3).await.unwrap();

    for sort in [ArticleSort::PublishTime, ArticleSort::LikeCount] {
        let key = ListKey::articles(1, sort);
        let cached = h.cache.snapshot(&key).unwrap();
        assert!(cached.iter().all(|e| e.member_id != 3));
        assert!(cached.last().unwrap().is_sentinel());

        let page = h
            .state
            .articles
            .articles(1, sort, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.is_end);
    }
}

#[tokio::test]
async fn follow_patches_both_warm_lists() {
    let h = harness();
    let following = ListKey::following(1);
    let fans = ListKey::fans(2);
    h.state
        .follows
        .follow_list(1, PageRequest::default())
        .await
        .unwrap();
    h.state
        .follows
        .fans_list(2, PageRequest::default())
        .await
        .unwrap();
    wait_for_cache(&h.cache, &following).await;
    wait_for_cache(&h.cache, &fans).await;

    h.state.mutations.follow(1, 2).await.unwrap();

    let cached = h.cache.snapshot(&following).unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].member_id, 2);
    let cached = h.cache.snapshot(&fans).unwrap();
    assert_eq!(cached[0].member_id, 1);

    let page = h
        .state
        .follows
        .follow_list(1, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].user_id, 2);
    assert_eq!(page.items[0].fans_count, 1);
    assert!(page.is_end);

    h.state.mutations.unfollow(1, 2).await.unwrap();
    assert_eq!(
        h.cache.snapshot(&following).unwrap(),
        vec![CacheEntry::sentinel()]
    );
    assert_eq!(h.cache.snapshot(&fans).unwrap(), vec![CacheEntry::sentinel()]);
}

#[tokio::test]
async fn follow_does_not_create_cold_lists() {
    let h = harness();
    h.state.mutations.follow(1, 2).await.unwrap();

    assert!(h.cache.snapshot(&ListKey::following(1)).is_none());
    assert!(h.cache.snapshot(&ListKey::fans(2)).is_none());
}

#[tokio::test]
async fn warm_lists_are_trimmed_to_the_cap() {
    let h = harness_with(ListSettings {
        max_cached: 3,
        ..ListSettings::default()
    });
    let fans = ListKey::fans(100);
    h.state
        .follows
        .fans_list(100, PageRequest::default())
        .await
        .unwrap();
    wait_for_cache(&h.cache, &fans).await;

    for follower in 1..=5 {
        h.state.mutations.follow(follower, 100).await.unwrap();
    }

    let cached = h.cache.snapshot(&fans).unwrap();
    assert_eq!(cached.len(), 3);
    assert!(cached.iter().all(|e| !e.is_sentinel()));

    // 截断后的缓存只是前缀，翻页越过前缀时回源，仍然拿到全部粉丝
    let mut seen = Vec::new();
    let mut cursor = 0;
    loop {
        let page = h
            .state
            .follows
            .fans_list(100, PageRequest::new(cursor, 2))
            .await
            .unwrap();
        seen.extend(page.items.iter().map(|i| i.user_id));
        cursor = page.next_cursor;
        if page.is_end {
            break;
        }
    }
    seen.sort();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}
