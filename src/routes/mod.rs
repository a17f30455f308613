// 路由
// 公开的列表读取路由和需要调用方身份的变更路由

pub mod article;
pub mod follow;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::middleware::{auth_middleware, log_errors};

/// 挂在 `/api` 下的全部路由
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/articles", get(article::list_articles))
        .route("/articles/{id}", get(article::article_detail))
        .route("/follows/following", get(follow::following))
        .route("/follows/fans", get(follow::fans));

    let protected_routes = Router::new()
        .route("/articles/publish", post(article::publish))
        .route("/articles/delete", post(article::delete_article))
        .route("/follows/follow", post(follow::follow))
        .route("/follows/unfollow", post(follow::unfollow))
        .layer(axum::middleware::from_fn(auth_middleware));

    Router::new()
        .nest("/api", Router::new().merge(public_routes).merge(protected_routes))
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
