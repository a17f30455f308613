// 缓存模块
// 包含列表缓存的键、数据结构和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use models::{CacheEntry, SENTINEL_MEMBER, SENTINEL_SCORE};
pub use operations::{CacheError, MemoryRankedListCache, RankedListCache, RedisRankedListCache};
