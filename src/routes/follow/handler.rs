use axum::{
    Extension,
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState, list::PageRequest, middleware::CurrentUser, utils::success_to_api_response,
};

use super::model::{FollowListQuery, FollowRequest};

#[axum::debug_handler]
pub async fn follow(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<FollowRequest>,
) -> impl IntoResponse {
    match state.mutations.follow(user_id, req.target_id).await {
        Ok(()) => (StatusCode::OK, success_to_api_response(())),
        Err(e) => e.to_api_response(),
    }
}

#[axum::debug_handler]
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<FollowRequest>,
) -> impl IntoResponse {
    match state.mutations.unfollow(user_id, req.target_id).await {
        Ok(()) => (StatusCode::OK, success_to_api_response(())),
        Err(e) => e.to_api_response(),
    }
}

#[axum::debug_handler]
pub async fn following(
    State(state): State<AppState>,
    Query(query): Query<FollowListQuery>,
) -> impl IntoResponse {
    let request = PageRequest::new(query.cursor, query.page_size);
    match state.follows.follow_list(query.user_id, request).await {
        Ok(page) => (StatusCode::OK, success_to_api_response(page)),
        Err(e) => e.to_api_response(),
    }
}

#[axum::debug_handler]
pub async fn fans(
    State(state): State<AppState>,
    Query(query): Query<FollowListQuery>,
) -> impl IntoResponse {
    let request = PageRequest::new(query.cursor, query.page_size);
    match state.follows.fans_list(query.user_id, request).await {
        Ok(page) => (StatusCode::OK, success_to_api_response(page)),
        Err(e) => e.to_api_response(),
    }
}
