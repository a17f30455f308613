use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod list;
pub mod middleware;
pub mod mutation;
pub mod routes;
pub mod services;
pub mod utils;

use cache::RankedListCache;
use database::{ArticleStore, FollowStore};
use list::ListSettings;
use mutation::MutationCoordinator;
use services::{ArticleService, FollowService};

#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<ArticleService>,
    pub follows: Arc<FollowService>,
    pub mutations: Arc<MutationCoordinator>,
}

impl AppState {
    /// 按构造函数把存储和缓存注入各个组件
    pub fn new(
        article_store: Arc<dyn ArticleStore>,
        follow_store: Arc<dyn FollowStore>,
        cache: Arc<dyn RankedListCache>,
        settings: ListSettings,
    ) -> Self {
        Self {
            articles: Arc::new(ArticleService::new(
                article_store.clone(),
                cache.clone(),
                settings.clone(),
            )),
            follows: Arc::new(FollowService::new(
                follow_store.clone(),
                cache.clone(),
                settings.clone(),
            )),
            mutations: Arc::new(MutationCoordinator::new(
                article_store,
                follow_store,
                cache,
                settings,
            )),
        }
    }
}
