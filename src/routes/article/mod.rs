mod handler;
mod model;

pub use handler::{article_detail, delete_article, list_articles, publish};
pub use model::{ArticleDetail, ArticleItem, PublishResponse};
