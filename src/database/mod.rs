// 数据库模块
// 包含数据库实体定义和存储操作

pub mod models; // 数据库实体定义
pub mod operations; // 数据库操作实现

use thiserror::Error;

// 重新导出常用类型，方便其他模块使用
pub use operations::{ArticleOperation, ArticleStore, FollowOperation, FollowStore, MemoryStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
