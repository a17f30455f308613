pub mod article;
pub mod follow;

pub use article::{ArticleEntity, ArticleStatus, NewArticle};
pub use follow::{FollowCountEntity, FollowEntity, FollowStatus};
