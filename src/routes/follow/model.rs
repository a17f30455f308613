use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub target_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    pub user_id: i64,
    #[serde(default)]
    pub cursor: i64,
    #[serde(default)]
    pub page_size: i64,
}
