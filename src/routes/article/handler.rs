use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    list::{ArticleSort, PageRequest},
    middleware::CurrentUser,
    mutation::ArticleDraft,
    utils::success_to_api_response,
};

use super::model::{
    ArticleDetail, ArticleItem, DeleteArticleRequest, ListArticlesQuery, PublishResponse,
};

#[axum::debug_handler]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> impl IntoResponse {
    let sort = match ArticleSort::from_code(query.sort_type) {
        Ok(sort) => sort,
        Err(e) => return e.to_api_response(),
    };
    let request = PageRequest::new(query.cursor, query.page_size);

    match state.articles.articles(query.author_id, sort, request).await {
        Ok(page) => (
            StatusCode::OK,
            success_to_api_response(page.map(ArticleItem::from)),
        ),
        Err(e) => e.to_api_response(),
    }
}

#[axum::debug_handler]
pub async fn article_detail(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> impl IntoResponse {
    match state.articles.article_detail(article_id).await {
        Ok(article) => (
            StatusCode::OK,
            success_to_api_response(article.map(ArticleDetail::from)),
        ),
        Err(e) => e.to_api_response(),
    }
}

#[axum::debug_handler]
pub async fn publish(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(draft): Json<ArticleDraft>,
) -> impl IntoResponse {
    match state.mutations.publish(user_id, draft).await {
        Ok(article_id) => (
            StatusCode::OK,
            success_to_api_response(PublishResponse { article_id }),
        ),
        Err(e) => e.to_api_response(),
    }
}

#[axum::debug_handler]
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<DeleteArticleRequest>,
) -> impl IntoResponse {
    match state.mutations.soft_delete(user_id, req.article_id).await {
        Ok(()) => (StatusCode::OK, success_to_api_response(())),
        Err(e) => e.to_api_response(),
    }
}
