// 业务服务
// 文章列表和关注列表的读取门面，组装数据来源和列表读取器

pub mod articles;
pub mod follows;

pub use articles::{ArticleListSource, ArticleService};
pub use follows::{FollowListSource, FollowService, FollowUserItem};
